//! Shared utilities for use cases.

use crate::use_cases::run_discussion::OrchestratorError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(OrchestratorError::Cancelled)` once the token is cancelled.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), OrchestratorError> {
    if token.is_cancelled() {
        return Err(OrchestratorError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cancelled() {
        let token = CancellationToken::new();
        assert!(check_cancelled(&token).is_ok());
        token.cancel();
        assert!(check_cancelled(&token).unwrap_err().is_cancelled());
    }
}
