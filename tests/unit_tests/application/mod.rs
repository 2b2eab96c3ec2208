mod auth_service_test;
mod job_lifecycle_service_test;
