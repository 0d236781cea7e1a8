//! Core configuration and error types.

mod config;
mod error;

pub use config::{expand_env_vars, ConfigError, ModelDeclaration, RunConfig};
pub use error::{LinkriskError, Result};
