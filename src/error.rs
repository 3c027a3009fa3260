//! Errors raised while resolving configuration

use crate::config::layer::LayerSource;
use std::path::PathBuf;
use thiserror::Error;

/// Every condition that aborts resolution.
///
/// Missing optional sources are not errors; see
/// [`crate::config::loader::SourceOutcome::Absent`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{source_kind} source {} could not be read: {message}", .path.display())]
    Unreadable { source_kind: LayerSource, path: PathBuf, message: String },

    #[error(
        "database.url not provided and {missing} is empty; set database.url or both database.user and database.password"
    )]
    MissingCredential { missing: &'static str },

    #[error("invalid value {value:?} for {key} (expected {expected}): {reason}")]
    TypeCoercion { key: String, expected: &'static str, value: String, reason: String },

    #[error("no value for {key} in any configuration source")]
    MissingValue { key: String },

    #[error("failed to parse flags: {0}")]
    FlagParse(#[from] clap::Error),
}

impl ConfigError {
    pub(crate) fn coercion(
        key: &str,
        expected: &'static str,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::TypeCoercion {
            key: key.to_string(),
            expected,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
