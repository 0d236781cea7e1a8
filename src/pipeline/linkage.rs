//! Linkage game setup driver.
//!
//! Pipeline flow:
//! Runconfig → Population load → Partition (targets / residual / auxiliary)
//! → Model registry → handoff to attack evaluation
//!
//! Fail-fast throughout: a partial or incorrect experimental setup silently
//! produces invalid privacy conclusions, which is worse than stopping, so
//! no step is retried and no error is swallowed.

use crate::data::{load_local, Dataset, Metadata};
use crate::models::{LinkriskError, Result, RunConfig};
use crate::sampling::{partition, SeededSampler};
use crate::synth::{build_models, GenerativeModel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything the attack-evaluation stage consumes.
///
/// The sampler is handed off too: attack evaluation continues drawing from
/// the same sequential random state, so a whole run stays reproducible from
/// the single configured seed.
pub struct GameInputs {
    pub targets: Dataset,
    pub residual: Dataset,
    pub auxiliary: Dataset,
    pub models: Vec<Box<dyn GenerativeModel>>,
    pub metadata: Metadata,
    pub sampler: SeededSampler,
}

/// Linkage game setup: composes loading, partitioning, and the registry.
pub struct LinkageGame {
    config: RunConfig,
}

/// Record of what was set up, written to the output directory.
#[derive(Serialize)]
struct SetupManifest {
    seed: u64,
    created_at: DateTime<Utc>,
    population: usize,
    targets: usize,
    residual: usize,
    auxiliary: usize,
    models: Vec<String>,
}

impl LinkageGame {
    /// Create a game from a validated configuration.
    ///
    /// Validation is eager: unknown model families and malformed parameter
    /// tuples fail here, before any data is loaded or anything is sampled.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the full setup and hand off the game inputs.
    ///
    /// Steps, in order: load `(population, metadata)` from `data_stem`,
    /// ensure `outdir` exists, seed the sampler exactly once, partition
    /// (targets drawn before auxiliary knowledge), build the model list,
    /// write the setup manifest.
    pub fn prepare(&self, data_stem: &Path, outdir: &Path) -> Result<GameInputs> {
        let (population, metadata) = load_local(data_stem)?;

        std::fs::create_dir_all(outdir).map_err(|e| {
            LinkriskError::io(format!("creating output directory {outdir:?}"), e)
        })?;

        let mut sampler = SeededSampler::new(self.config.seed);
        let game = partition(&population, &self.config, &mut sampler)?;
        let models = build_models(&metadata, &self.config.generative_models)?;

        let manifest = SetupManifest {
            seed: self.config.seed,
            created_at: Utc::now(),
            population: population.len(),
            targets: game.targets.len(),
            residual: game.residual.len(),
            auxiliary: game.auxiliary.len(),
            models: models.iter().map(|m| m.label()).collect(),
        };
        let content = serde_json::to_string_pretty(&manifest)
            .map_err(|e| LinkriskError::Internal(format!("serializing setup manifest: {e}")))?;
        std::fs::write(outdir.join("game_setup.json"), content)
            .map_err(|e| LinkriskError::io("writing setup manifest", e))?;

        info!(
            seed = self.config.seed,
            targets = game.targets.len(),
            auxiliary = game.auxiliary.len(),
            models = models.len(),
            "Linkage game setup complete"
        );

        Ok(GameInputs {
            targets: game.targets,
            residual: game.residual,
            auxiliary: game.auxiliary,
            models,
            metadata,
            sampler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigError, ModelDeclaration};
    use std::collections::HashSet;
    use std::fmt::Write as _;
    use tempfile::TempDir;

    fn write_population(dir: &TempDir, n: usize) -> std::path::PathBuf {
        let stem = dir.path().join("pop");
        std::fs::write(
            stem.with_extension("json"),
            r#"{"columns": [
                {"name": "age", "type": "Integer", "min": 0, "max": 120},
                {"name": "sex", "type": "Categorical", "categories": ["M", "F"]}
            ]}"#,
        )
        .unwrap();

        let mut csv = String::from("id,age,sex\n");
        for i in 0..n {
            writeln!(csv, "key_{i},{},{}", 20 + i % 60, if i % 2 == 0 { "M" } else { "F" })
                .unwrap();
        }
        std::fs::write(stem.with_extension("csv"), csv).unwrap();
        stem
    }

    fn config(n_targets: usize, size_raw_a: usize) -> RunConfig {
        RunConfig {
            seed: 42,
            n_targets,
            targets: None,
            size_raw_a,
            generative_models: vec![
                ModelDeclaration {
                    family: "BayesianNet".to_string(),
                    params: vec![vec![3.0]],
                },
                ModelDeclaration {
                    family: "PrivBayes".to_string(),
                    params: vec![vec![1.0, 0.1], vec![2.0, 0.5]],
                },
            ],
        }
    }

    #[test]
    fn test_end_to_end_setup() {
        let dir = TempDir::new().unwrap();
        let stem = write_population(&dir, 1000);
        let outdir = dir.path().join("out");

        let game = LinkageGame::new(config(10, 100)).unwrap();
        let inputs = game.prepare(&stem, &outdir).unwrap();

        assert_eq!(inputs.targets.len(), 10);
        assert_eq!(inputs.auxiliary.len(), 100);
        assert_eq!(inputs.residual.len(), 990);

        let targets: HashSet<_> = inputs.targets.index().into_iter().collect();
        let auxiliary: HashSet<_> = inputs.auxiliary.index().into_iter().collect();
        assert!(targets.is_disjoint(&auxiliary));

        let labels: Vec<String> = inputs.models.iter().map(|m| m.label()).collect();
        assert_eq!(
            labels,
            vec!["BayesianNet(3)", "PrivBayes(1, 0.1)", "PrivBayes(2, 0.5)"]
        );

        assert!(outdir.is_dir());
        let manifest = std::fs::read_to_string(outdir.join("game_setup.json")).unwrap();
        assert!(manifest.contains("\"targets\": 10"));
        assert!(manifest.contains("PrivBayes(2, 0.5)"));
    }

    #[test]
    fn test_end_to_end_pinned_targets() {
        let dir = TempDir::new().unwrap();
        let stem = write_population(&dir, 200);
        let outdir = dir.path().join("out");

        // Find two keys the seed does not draw among its 5.
        let mut cfg = config(5, 20);
        let probe = LinkageGame::new(cfg.clone()).unwrap();
        let drawn: HashSet<_> = probe
            .prepare(&stem, &outdir)
            .unwrap()
            .targets
            .index()
            .into_iter()
            .collect();
        let pinned: Vec<String> = (0..200)
            .map(|i| format!("key_{i}"))
            .filter(|k| !drawn.contains(&crate::data::RecordId::from(k.as_str())))
            .take(2)
            .collect();
        cfg.targets = Some(pinned.clone());

        let game = LinkageGame::new(cfg).unwrap();
        let inputs = game.prepare(&stem, &outdir).unwrap();

        assert_eq!(inputs.targets.len(), 7);
        for key in &pinned {
            assert!(inputs
                .targets
                .contains(&crate::data::RecordId::from(key.as_str())));
        }
    }

    #[test]
    fn test_two_runs_identical_under_seed() {
        let dir = TempDir::new().unwrap();
        let stem = write_population(&dir, 500);

        let run = |out: &str| {
            let game = LinkageGame::new(config(10, 50)).unwrap();
            game.prepare(&stem, &dir.path().join(out)).unwrap()
        };
        let a = run("out_a");
        let b = run("out_b");

        assert_eq!(a.targets.index(), b.targets.index());
        assert_eq!(a.auxiliary.index(), b.auxiliary.index());
        assert_eq!(
            a.models.iter().map(|m| m.label()).collect::<Vec<_>>(),
            b.models.iter().map(|m| m.label()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unknown_family_rejected_at_construction() {
        let mut cfg = config(5, 20);
        cfg.generative_models.push(ModelDeclaration {
            family: "CTGAN".to_string(),
            params: vec![vec![1.0]],
        });

        match LinkageGame::new(cfg) {
            Err(LinkriskError::Config(ConfigError::UnknownModelFamily(family))) => {
                assert_eq!(family, "CTGAN")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("unknown family was accepted"),
        }
    }

    #[test]
    fn test_handed_off_models_are_usable() {
        let dir = TempDir::new().unwrap();
        let stem = write_population(&dir, 300);
        let outdir = dir.path().join("out");

        let game = LinkageGame::new(config(10, 100)).unwrap();
        let mut inputs = game.prepare(&stem, &outdir).unwrap();

        // Downstream contract: fit on the auxiliary sample, then generate.
        let auxiliary = inputs.auxiliary.clone();
        let model = &mut inputs.models[0];
        model.fit(&auxiliary, inputs.sampler.rng()).unwrap();
        let synthetic = model.generate(25, inputs.sampler.rng()).unwrap();
        assert_eq!(synthetic.len(), 25);
        assert_eq!(synthetic.columns(), inputs.auxiliary.columns());
    }
}
