use crate::types::DbId;

/// Errors returned by a [`RecordStore`](crate::store::RecordStore).
///
/// `PermissionDenied` is kept apart from every other failure because it
/// drives the "unauthorized" view state instead of a transient alert.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by an [`IdentityProvider`](crate::identity::IdentityProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The requested sign-in transport cannot run here; the caller should
    /// retry with the alternate transport.
    #[error("Sign-in transport not supported in this environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("Sign-in failed: {0}")]
    Failed(String),
}

/// One id that a bulk operation could not update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BatchFailure {
    pub id: DbId,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Bulk update failed for {} of {attempted} records", .failures.len())]
    PartialBatch {
        attempted: usize,
        failures: Vec<BatchFailure>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(msg) => CoreError::Forbidden(msg),
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            StoreError::Unavailable(msg) => CoreError::Network(msg),
        }
    }
}

impl CoreError {
    /// `true` when the store rejected the operation on access rules.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CoreError::Forbidden(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_maps_to_forbidden() {
        let err = CoreError::from(StoreError::PermissionDenied("rules".into()));
        assert!(err.is_permission_denied());
    }

    #[test]
    fn unavailable_maps_to_network() {
        let err = CoreError::from(StoreError::Unavailable("timeout".into()));
        assert!(matches!(err, CoreError::Network(msg) if msg == "timeout"));
    }

    #[test]
    fn partial_batch_message_counts_failures() {
        let err = CoreError::PartialBatch {
            attempted: 3,
            failures: vec![BatchFailure {
                id: 7,
                reason: "denied".into(),
            }],
        };
        assert_eq!(err.to_string(), "Bulk update failed for 1 of 3 records");
    }
}
