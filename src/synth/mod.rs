//! Candidate generative models under evaluation.
//!
//! The game setup only constructs model instances; fitting and generation
//! are exercised by the downstream attack-evaluation stage through the
//! [`GenerativeModel`] capability contract.

mod bayes;
pub mod registry;

pub use bayes::{BayesianNet, PrivBayes};
pub use registry::build_models;

use crate::data::Dataset;
use crate::models::Result;
use rand::rngs::StdRng;

/// Capability contract for a candidate generative model.
///
/// The rng is threaded explicitly: models draw from the same sequential
/// random state as the sampler, keeping a whole run reproducible from the
/// single configured seed.
pub trait GenerativeModel {
    /// Human-readable instance label, e.g. `PrivBayes(1, 0.1)`.
    ///
    /// Labels are positionally correlated with the runconfig declaration
    /// order in downstream reports.
    fn label(&self) -> String;

    /// Fit the model to a population sample.
    fn fit(&mut self, data: &Dataset, rng: &mut StdRng) -> Result<()>;

    /// Generate `n` synthetic records resembling the fitted sample.
    fn generate(&self, n: usize, rng: &mut StdRng) -> Result<Dataset>;
}
