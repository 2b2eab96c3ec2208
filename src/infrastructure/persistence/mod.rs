mod pg_job_change_listener;
mod pg_pool;
mod repositories;

pub use pg_job_change_listener::{JOB_CHANGES_CHANNEL, PgJobChangeListener};
pub use pg_pool::{create_pool, run_migrations};
pub use repositories::{
    InMemoryJobRepository, InMemoryProfileRepository, PgJobRepository, PgProfileRepository,
};
