//! Run configuration for the linkage game.
//!
//! All I^R (resolvable ignorance) is parameterized here.
//! The user resolves these unknowns at runtime via a runconfig file.
//!
//! Key names mirror the published runconfig format (`nTargets`, `Targets`,
//! `sizeRawA`, `generativeModels`). One shape differs: `generativeModels`
//! is an ordered array of `{ family, params }` tables rather than a map,
//! because declaration order is normative and TOML maps are unordered.

use serde::{Deserialize, Serialize};

/// Top-level run configuration.
///
/// I^R resolved: every randomized choice in the game setup is governed by
/// `seed`, so the same runconfig reproduces identical partitions and model
/// lists bit-for-bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Global seed for all sampling in this run
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of target records drawn at random from the population
    #[serde(rename = "nTargets")]
    pub n_targets: usize,

    /// Explicitly pinned target record identifiers (optional).
    /// Appended to the randomly drawn set; duplicates contribute nothing.
    #[serde(rename = "Targets", default)]
    pub targets: Option<Vec<String>>,

    /// Size of the adversary's auxiliary-knowledge sample,
    /// drawn from the residual population (never overlaps targets)
    #[serde(rename = "sizeRawA")]
    pub size_raw_a: usize,

    /// Candidate generative models to evaluate, in declaration order.
    ///
    /// K_i: declaration order is normative; downstream result reporting
    /// correlates instances back to this list positionally. The runconfig
    /// therefore declares models as an ordered array of tables rather than
    /// a map.
    #[serde(rename = "generativeModels", default)]
    pub generative_models: Vec<ModelDeclaration>,
}

fn default_seed() -> u64 {
    42
}

/// One generative-model family declaration.
///
/// Each entry in `params` is one parameter tuple and instantiates exactly
/// one model bound to the population metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDeclaration {
    /// Family name (e.g. "BayesianNet", "PrivBayes")
    pub family: String,

    /// Parameter tuples, one model instance per tuple
    pub params: Vec<Vec<f64>>,
}

impl RunConfig {
    /// Load a run configuration from a TOML file.
    ///
    /// B_i(file exists) → Result
    /// B_i(file is valid TOML) → Result
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all fields eagerly, before any sampling begins.
    ///
    /// Family names and parameter tuples are checked against the closed set
    /// of supported model families; an unknown family or malformed tuple is
    /// fatal here rather than a silently skipped entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::synth::registry::validate_declarations(&self.generative_models)
    }

    /// Total number of model instances the declarations will produce.
    pub fn declared_instances(&self) -> usize {
        self.generative_models.iter().map(|d| d.params.len()).sum()
    }
}

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax, for path-like runconfig values.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(s) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

/// Configuration errors.
///
/// Epistemic origin:
/// - B_i falsified: File not found, parse error
/// - I^B materialized: Out-of-range or unrecognized values
///
/// All of these are fatal and never retried: a partially applied runconfig
/// would produce an experiment that measures something other than what was
/// declared.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read runconfig file {path}: {source}")]
    FileRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse runconfig file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot draw {requested} {pool} record(s): only {available} available")]
    SampleTooLarge {
        pool: String,
        requested: usize,
        available: usize,
    },

    #[error("Unknown generative model family '{0}'")]
    UnknownModelFamily(String),

    #[error("Invalid parameters for model family '{family}': {detail}")]
    InvalidModelParams { family: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runconfig_keys() {
        let toml_str = r#"
            seed = 7
            nTargets = 10
            Targets = ["hcup_1", "hcup_2"]
            sizeRawA = 100

            [[generativeModels]]
            family = "BayesianNet"
            params = [[3]]

            [[generativeModels]]
            family = "PrivBayes"
            params = [[1, 0.1], [2, 0.5]]
        "#;

        let config: RunConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_targets, 10);
        assert_eq!(config.size_raw_a, 100);
        assert_eq!(
            config.targets,
            Some(vec!["hcup_1".to_string(), "hcup_2".to_string()])
        );
        assert_eq!(config.generative_models.len(), 2);
        assert_eq!(config.generative_models[0].family, "BayesianNet");
        assert_eq!(config.generative_models[1].params.len(), 2);
        assert_eq!(config.declared_instances(), 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: RunConfig = toml::from_str("nTargets = 5\nsizeRawA = 20").unwrap();
        assert_eq!(config.seed, 42);
        assert!(config.targets.is_none());
        assert!(config.generative_models.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_family() {
        let toml_str = r#"
            nTargets = 5
            sizeRawA = 20

            [[generativeModels]]
            family = "IndHist"
            params = [[1]]
        "#;

        let config: RunConfig = toml::from_str(toml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModelFamily(ref f) if f == "IndHist"));
    }

    #[test]
    fn test_validate_rejects_bad_arity() {
        let toml_str = r#"
            nTargets = 5
            sizeRawA = 20

            [[generativeModels]]
            family = "PrivBayes"
            params = [[1]]
        "#;

        let config: RunConfig = toml::from_str(toml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidModelParams { ref family, .. } if family == "PrivBayes"));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("LINKRISK_TEST_DIR", "/tmp/linkage");
        assert_eq!(
            expand_env_vars("${LINKRISK_TEST_DIR}/out"),
            "/tmp/linkage/out"
        );
        assert_eq!(
            expand_env_vars("${LINKRISK_UNSET_VAR}/out"),
            "${LINKRISK_UNSET_VAR}/out"
        );
    }
}
