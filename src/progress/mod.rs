pub mod tracker;

pub use tracker::{ProgressSnapshot, ProgressTracker};

#[cfg(test)]
mod tests;
