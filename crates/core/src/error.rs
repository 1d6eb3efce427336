//! Errors for malformed ticket vocabulary

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors raised while interpreting user-supplied ticket vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid reference number format")]
    InvalidReference { input: String },

    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
}

impl CoreError {
    /// Create an invalid reference number error
    pub fn invalid_reference(input: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
        }
    }

    /// Create an unknown value error for the given vocabulary kind
    pub fn unknown_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reference_matches_backend_message() {
        let err = CoreError::invalid_reference("XY1");
        assert_eq!(err.to_string(), "Invalid reference number format");
    }

    #[test]
    fn test_unknown_value_names_the_kind() {
        let err = CoreError::unknown_value("priority", "urgent");
        assert_eq!(err.to_string(), "Unknown priority: urgent");
    }
}
