//! Experiment drivers.

mod linkage;

pub use linkage::{GameInputs, LinkageGame};
