//! linkrisk - linkability privacy-risk evaluation for synthetic data generators.
//!
//! ## Architecture
//!
//! linkrisk sets up the inputs to an adversarial linkage game:
//! - **Partition**: three disjoint views over the loaded population:
//!   targets, residual population, and the adversary's auxiliary knowledge
//! - **Registry**: candidate generative models instantiated from the
//!   runconfig, in declaration order
//!
//! The attack-evaluation stage consumes the resulting [`GameInputs`];
//! this crate guarantees the statistical integrity of what it hands off:
//! auxiliary knowledge never overlaps ground-truth targets, and the whole
//! setup is reproducible from one configured seed.
//!
//! ## Epistemic Design
//!
//! - K_i (Knowledge): Compile-time enforced invariants (types, closed model
//!   family set)
//! - B_i (Beliefs): Runtime fallible operations (Result, Option)
//! - I^R (Resolvable): User-configurable run parameters
//! - I^B (Bounded): Filesystem uncertainties, surfaced verbatim and fatal

pub mod data;
pub mod models;
pub mod pipeline;
pub mod sampling;
pub mod synth;

// Re-exports for convenience
pub use data::{load_local, Dataset, Metadata, RecordId, Value};
pub use models::{
    expand_env_vars, ConfigError, LinkriskError, ModelDeclaration, Result, RunConfig,
};
pub use pipeline::{GameInputs, LinkageGame};
pub use sampling::{partition, GamePartition, SeededSampler};
pub use synth::{build_models, BayesianNet, GenerativeModel, PrivBayes};
