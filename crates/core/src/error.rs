//! Error types for the RecallKit domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all RecallKit operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Context engine errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors raised at the context engine's input boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContextError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl ContextError {
    /// Shorthand for an [`ContextError::InvalidInput`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_displays_field_and_reason() {
        let err = Error::Context(ContextError::invalid("importance", "must be within [0, 1], got 1.5"));
        assert!(err.to_string().contains("importance"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn context_error_converts_into_top_level() {
        fn fails() -> Result<()> {
            let checked: std::result::Result<(), ContextError> =
                Err(ContextError::invalid("recency_weight", "must be non-negative"));
            checked?;
            Ok(())
        }
        assert!(matches!(fails(), Err(Error::Context(_))));
    }
}
