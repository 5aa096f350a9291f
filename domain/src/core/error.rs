//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid model descriptor: {0}")]
    InvalidModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_model_display() {
        let error = DomainError::InvalidModel("empty id".to_string());
        assert_eq!(error.to_string(), "Invalid model descriptor: empty id");
    }
}
