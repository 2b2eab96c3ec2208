pub mod assistant;
pub mod identity;
pub mod observability;
pub mod payments;
pub mod persistence;
pub mod realtime;
