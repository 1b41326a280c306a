use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::storage::{Record, RecordPatch};

/// Soft-delete lifecycle shared by employees, projects and treasury accounts.
///
/// `Active <-> Inactive` via toggle; `Inactive -> Deleted` is the only way to
/// reach the terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    Inactive,
    Deleted,
}

impl LifecycleState {
    pub fn from_active(is_active: bool) -> Self {
        if is_active {
            LifecycleState::Active
        } else {
            LifecycleState::Inactive
        }
    }

    pub fn toggled(self) -> Result<Self, RecordError> {
        match self {
            LifecycleState::Active => Ok(LifecycleState::Inactive),
            LifecycleState::Inactive => Ok(LifecycleState::Active),
            LifecycleState::Deleted => Err(RecordError::InvalidTransition {
                from: self,
                action: "toggle",
            }),
        }
    }

    pub fn deleted(self) -> Result<Self, RecordError> {
        match self {
            LifecycleState::Inactive => Ok(LifecycleState::Deleted),
            _ => Err(RecordError::InvalidTransition {
                from: self,
                action: "delete",
            }),
        }
    }
}

pub trait Lifecycle: Record {
    fn is_active(&self) -> bool;

    fn lifecycle_state(&self) -> LifecycleState {
        LifecycleState::from_active(self.is_active())
    }

    /// Guard run before any destructive store call.
    fn ensure_deletable(&self) -> Result<(), RecordError> {
        match self.lifecycle_state().deleted() {
            Ok(_) => Ok(()),
            Err(_) => Err(RecordError::ActiveRecord {
                label: Self::LABEL,
                id: self.id(),
            }),
        }
    }
}

/// Single-field patch flipping `is_active`.
pub fn toggle_patch<T: Lifecycle>(record: &T) -> Result<RecordPatch, RecordError> {
    let next = record.lifecycle_state().toggled()?;
    Ok(RecordPatch::new().with("is_active", next == LifecycleState::Active))
}
