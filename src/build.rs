pub mod freshness;
pub mod scheduler;
