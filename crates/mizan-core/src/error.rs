use thiserror::Error;
use uuid::Uuid;

use crate::forms::FieldErrors;
use crate::lifecycle::LifecycleState;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("cannot reach the data store: {0}")]
    Connectivity(String),
    #[error("table `{table}` does not have the expected structure")]
    Schema { table: &'static str },
    #[error("scoped query for company {company_id} failed: {message}")]
    ScopedQuery { company_id: String, message: String },
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("persistence failed: {0}")]
    Persistence(#[source] StoreError),
    #[error("cannot delete active {label} {id}; deactivate it first")]
    ActiveRecord { label: &'static str, id: Uuid },
    #[error("{label} {id} not found")]
    NotFound { label: &'static str, id: Uuid },
    #[error("another action is already running for record {0}")]
    Busy(Uuid),
    #[error("action cancelled")]
    Cancelled,
    #[error("cannot {action} a record in state {from:?}")]
    InvalidTransition {
        from: LifecycleState,
        action: &'static str,
    },
}

impl RecordError {
    /// Load failures keep the list in its error state until a manual retry.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            RecordError::Connectivity(_)
                | RecordError::Schema { .. }
                | RecordError::ScopedQuery { .. }
        )
    }
}
