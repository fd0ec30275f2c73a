pub mod audit;
pub mod tasks;
