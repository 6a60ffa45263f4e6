pub mod assessment;
pub mod executors;
