use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: &'static str },
}

impl IdError {
    pub(crate) fn invalid(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidIdentifier {
            input: input.into(),
            reason,
        }
    }

    /// The rejected input, as received.
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidIdentifier { input, .. } => input,
        }
    }
}

/// An identifier-shaped field in a JSON graph that is not a valid string id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier field at {path} is not a string id (found {found})")]
pub struct GraphViolation {
    /// JSON-pointer-like location, e.g. `$[0].filament.vendor.id`.
    pub path: String,
    /// Short description of the offending value.
    pub found: String,
}
