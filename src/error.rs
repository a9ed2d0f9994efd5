//! Error taxonomy for the cost accrual core.
//!
//! All errors are handled locally by the component that detects them;
//! nothing here aborts a simulation run.

use thiserror::Error;

/// Errors raised by the cost accrual components.
#[derive(Error, Debug)]
pub enum CostError {
    /// A caller passed a value that is rejected at the boundary, such as a
    /// negative cost amount or a non-positive trigger interval. No partial
    /// state is committed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A resource is marked as priced but its cost specification is missing
    /// or malformed at the moment completion is declared. The resource stays
    /// unpriced for the remainder of the run.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A trigger action failed while firing. Caught at the trigger boundary;
    /// the trigger re-arms regardless.
    #[error("action failure: {0}")]
    Action(String),
}

/// Result type for cost accrual operations.
pub type CostResult<T> = Result<T, CostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CostError::InvalidInput("negative amount -1".to_string());
        assert_eq!(err.to_string(), "invalid input: negative amount -1");

        let err = CostError::Configuration("missing field 'unit'".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
