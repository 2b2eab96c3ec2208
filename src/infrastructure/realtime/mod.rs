mod job_change_bus;

pub use job_change_bus::JobChangeBus;
