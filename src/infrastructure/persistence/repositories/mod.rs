mod in_memory_repository;
mod pg_job_repository;
mod pg_profile_repository;

pub use in_memory_repository::{InMemoryJobRepository, InMemoryProfileRepository};
pub use pg_job_repository::PgJobRepository;
pub use pg_profile_repository::PgProfileRepository;
