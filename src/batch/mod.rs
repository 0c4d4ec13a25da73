pub mod generator;
pub mod planner;
pub mod types;

pub use generator::{Batch, BatchGenerator, TimeWindow};
pub use planner::{BatchDescriptor, BatchPlanner, Descriptors};
pub use types::BatchError;
