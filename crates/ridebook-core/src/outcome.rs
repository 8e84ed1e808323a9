// ── Mutation outcome contract ──

use ridebook_api::GENERIC_FAILURE;
use serde::Serialize;

use crate::error::CoreError;

/// What every store mutation returns.
///
/// Failures never escape as `Err`; they arrive here with a non-empty
/// `error` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> MutationOutcome<T> {
    pub fn success(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    /// A failed outcome. Blank messages are replaced with a generic one.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_owned()
        } else {
            message
        };
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }

    pub fn from_error(err: &CoreError) -> Self {
        Self::failure(err.message())
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MutationOutcome<U> {
        MutationOutcome {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// `Ok(data)` on success, `Err(message)` otherwise.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| GENERIC_FAILURE.to_owned()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_is_never_blank() {
        let outcome = MutationOutcome::<()>::failure("  ");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(GENERIC_FAILURE));
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn success_serializes_without_error() {
        let json = serde_json::to_value(MutationOutcome::success(Some(7))).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 7 }));
    }
}
