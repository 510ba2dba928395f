//! Structured error types shared across the sampler crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`WlError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (energies, bounds, positions, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the operator resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the sampler.
///
/// Every variant is fatal for a run; there is no retry policy anywhere in the
/// engine. Reaching the step ceiling is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum WlError {
    /// An energy fell outside the configured histogram window.
    #[error("domain error: {0}")]
    Domain(ErrorInfo),
    /// A configuration has no legal moves or a move does not fit the configuration.
    #[error("move set error: {0}")]
    MoveSet(ErrorInfo),
    /// Allocation or size limits were exceeded.
    #[error("resource error: {0}")]
    Resource(ErrorInfo),
    /// Invalid run options or an unusable energy window.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Invalid sequence or structure handed to the energy model.
    #[error("model error: {0}")]
    Model(ErrorInfo),
    /// Filesystem and serialization failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl WlError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            WlError::Domain(info)
            | WlError::MoveSet(info)
            | WlError::Resource(info)
            | WlError::Config(info)
            | WlError::Model(info)
            | WlError::Io(info) => info,
        }
    }

    /// Convenience constructor for filesystem failures on a path.
    pub fn io(code: &str, err: impl ToString, path: &std::path::Path) -> Self {
        WlError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
    }
}
