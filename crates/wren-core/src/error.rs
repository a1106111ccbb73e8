//! Error taxonomy shared across Wren crates.
//!
//! Validation failures are returned synchronously from the call that received
//! the bad input. Failures raised *inside* listeners and commands are not
//! represented here: they are `anyhow::Error`s that the dispatcher logs and
//! contains.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed argument was passed to an API boundary.
    Argument,
    /// A state property was looked up by a name or type it was not declared with.
    State,
    /// Setup-time misconfiguration in surrounding glue (logging, CLI).
    Configuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{param} expects a non-empty string")]
    EmptyName { param: &'static str },

    #[error("index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("property '{name}' is not a state property")]
    UnknownProperty { name: String },

    #[error("property '{name}' holds {declared}, not {requested}")]
    PropertyType {
        name: String,
        declared: &'static str,
        requested: &'static str,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName { .. } | Self::IndexOutOfBounds { .. } => ErrorKind::Argument,
            Self::UnknownProperty { .. } | Self::PropertyType { .. } => ErrorKind::State,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Reject empty names.
pub(crate) fn require_non_empty(param: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::EmptyName { param });
    }
    Ok(())
}

/// Reject empty and whitespace-only names.
pub(crate) fn require_non_blank(param: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::EmptyName { param });
    }
    Ok(())
}
