//! Model registry builder.
//!
//! Interprets the `generativeModels` declarations into concrete model
//! instances, one per parameter tuple, bound to the shared population
//! metadata. The family set is closed: an unrecognized name is fatal
//! before anything is constructed from that declaration onward, since a
//! silently partial model list would invalidate comparative privacy-risk
//! conclusions.

use crate::data::Metadata;
use crate::models::{ConfigError, ModelDeclaration, Result};
use crate::synth::{BayesianNet, GenerativeModel, PrivBayes};

const BAYESIAN_NET: &str = "BayesianNet";
const PRIV_BAYES: &str = "PrivBayes";

/// Instantiate every declared model, in declaration order.
///
/// K_i: result order is family order, then parameter-tuple order within a
/// family, so downstream reporting correlates positionally with the
/// runconfig.
pub fn build_models(
    metadata: &Metadata,
    declarations: &[ModelDeclaration],
) -> Result<Vec<Box<dyn GenerativeModel>>> {
    let mut models: Vec<Box<dyn GenerativeModel>> = Vec::new();

    for declaration in declarations {
        match declaration.family.as_str() {
            BAYESIAN_NET => {
                for params in &declaration.params {
                    let degree = bayesian_net_params(params)?;
                    models.push(Box::new(BayesianNet::new(metadata.clone(), degree)));
                }
            }
            PRIV_BAYES => {
                for params in &declaration.params {
                    let (degree, epsilon) = priv_bayes_params(params)?;
                    models.push(Box::new(PrivBayes::new(metadata.clone(), degree, epsilon)));
                }
            }
            other => {
                return Err(ConfigError::UnknownModelFamily(other.to_string()).into());
            }
        }
    }

    Ok(models)
}

/// Check every declaration without constructing anything.
///
/// Used for eager runconfig validation, before any data is loaded or any
/// sampling begins.
pub fn validate_declarations(declarations: &[ModelDeclaration]) -> std::result::Result<(), ConfigError> {
    for declaration in declarations {
        match declaration.family.as_str() {
            BAYESIAN_NET => {
                for params in &declaration.params {
                    bayesian_net_params(params)?;
                }
            }
            PRIV_BAYES => {
                for params in &declaration.params {
                    priv_bayes_params(params)?;
                }
            }
            other => return Err(ConfigError::UnknownModelFamily(other.to_string())),
        }
    }
    Ok(())
}

/// `BayesianNet` takes one parameter: the network degree.
fn bayesian_net_params(params: &[f64]) -> std::result::Result<usize, ConfigError> {
    check_arity(BAYESIAN_NET, params, 1)?;
    parse_degree(BAYESIAN_NET, params[0])
}

/// `PrivBayes` takes two parameters: network degree and privacy budget ε.
fn priv_bayes_params(params: &[f64]) -> std::result::Result<(usize, f64), ConfigError> {
    check_arity(PRIV_BAYES, params, 2)?;
    let degree = parse_degree(PRIV_BAYES, params[0])?;
    let epsilon = params[1];
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(ConfigError::InvalidModelParams {
            family: PRIV_BAYES.to_string(),
            detail: format!("epsilon must be a positive number, got {epsilon}"),
        });
    }
    Ok((degree, epsilon))
}

fn check_arity(
    family: &str,
    params: &[f64],
    expected: usize,
) -> std::result::Result<(), ConfigError> {
    if params.len() != expected {
        return Err(ConfigError::InvalidModelParams {
            family: family.to_string(),
            detail: format!(
                "expected {expected} parameter(s) per tuple, got {}",
                params.len()
            ),
        });
    }
    Ok(())
}

fn parse_degree(family: &str, raw: f64) -> std::result::Result<usize, ConfigError> {
    if raw.fract() != 0.0 || raw < 1.0 || raw > u32::MAX as f64 {
        return Err(ConfigError::InvalidModelParams {
            family: family.to_string(),
            detail: format!("degree must be a positive integer, got {raw}"),
        });
    }
    Ok(raw as usize)
}
