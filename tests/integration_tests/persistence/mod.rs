mod pg_job_repository_test;
