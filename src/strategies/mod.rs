pub mod strategy;
pub mod round_robin;
