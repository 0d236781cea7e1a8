//! Population partitioning for the linkage game.
//!
//! The partition is the integrity core of the whole evaluation: the
//! adversary's auxiliary knowledge is drawn strictly from the residual
//! population, so it can never contain a ground-truth target record.

use crate::data::{Dataset, RecordId};
use crate::models::{LinkriskError, Result, RunConfig};
use crate::sampling::SeededSampler;
use std::collections::HashSet;
use tracing::info;

/// The three disjoint views over the population.
///
/// Invariants (checked by construction, asserted in tests):
/// - targets ∩ residual = ∅ and targets ∪ residual = population
/// - auxiliary ⊆ residual, hence auxiliary ∩ targets = ∅
#[derive(Debug)]
pub struct GamePartition {
    /// Attack-target records
    pub targets: Dataset,
    /// Population minus targets
    pub residual: Dataset,
    /// Adversary's prior knowledge, drawn from the residual
    pub auxiliary: Dataset,
}

/// Partition the population into targets, residual, and auxiliary knowledge.
///
/// Sampling order is fixed: targets first, then auxiliary. Both draws
/// advance the same sequential sampler state, so reordering them would
/// silently change every downstream result for a given seed.
///
/// Pinned identifiers from `config.Targets` are appended to the random
/// draw; a pinned id already drawn contributes no duplicate, and a pinned
/// id absent from the population index is fatal: an attack scored against
/// a record that does not exist would produce misleading results.
pub fn partition(
    population: &Dataset,
    config: &RunConfig,
    sampler: &mut SeededSampler,
) -> Result<GamePartition> {
    let index = population.index();
    let mut target_ids = sampler.sample_without_replacement(&index, config.n_targets, "target")?;

    if let Some(pinned) = &config.targets {
        let missing: Vec<&str> = pinned
            .iter()
            .filter(|id| !population.contains(&RecordId::from(id.as_str())))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(LinkriskError::data(format!(
                "pinned target record(s) not in population index: {}",
                missing.join(", ")
            )));
        }

        let mut seen: HashSet<RecordId> = target_ids.iter().cloned().collect();
        for id in pinned {
            let id = RecordId::from(id.as_str());
            if seen.insert(id.clone()) {
                target_ids.push(id);
            }
        }
    }

    let targets = population.select(&target_ids)?;
    let residual = population.drop_ids(&target_ids)?;

    let auxiliary_ids =
        sampler.sample_without_replacement(&residual.index(), config.size_raw_a, "auxiliary")?;
    let auxiliary = residual.select(&auxiliary_ids)?;

    info!(
        targets = targets.len(),
        residual = residual.len(),
        auxiliary = auxiliary.len(),
        "Partitioned population"
    );

    Ok(GamePartition {
        targets,
        residual,
        auxiliary,
    })
}
