//! Deterministic sampling and population partitioning.

mod partition;
mod rng;

pub use partition::{partition, GamePartition};
pub use rng::SeededSampler;
