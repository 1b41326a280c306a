use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::storage::{Record, RecordPatch};

/// Inline, per-field validation messages. Empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Takes a required value out of its optional form field.
    pub fn required<T>(field: &str, value: Option<T>, message: &str) -> Result<T, FieldErrors> {
        value.ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.add(field, message);
            errors
        })
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// What a form hands back to its list once it validates.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest<T> {
    Create(T),
    Update { id: Uuid, patch: RecordPatch },
}

impl<T: Record> SaveRequest<T> {
    pub fn is_create(&self) -> bool {
        matches!(self, SaveRequest::Create(_))
    }
}

pub trait RecordForm {
    type Record: Record;

    /// Fields an edit may write. Anything else is fixed after creation.
    const EDITABLE_FIELDS: &'static [&'static str];

    fn validate(&self) -> FieldErrors;

    /// Builds the full record: a new one when `existing` is `None`, otherwise
    /// the edited copy of `existing`. Fails only on a missing required value.
    fn build(
        &self,
        existing: Option<&Self::Record>,
        company_id: &str,
    ) -> Result<Self::Record, FieldErrors>;

    fn submit(
        &self,
        existing: Option<&Self::Record>,
        company_id: &str,
    ) -> Result<SaveRequest<Self::Record>, FieldErrors> {
        self.validate().into_result()?;

        let built = self.build(existing, company_id)?;
        match existing {
            None => Ok(SaveRequest::Create(built)),
            Some(before) => Ok(SaveRequest::Update {
                id: before.id(),
                patch: diff_fields(before, &built, Self::EDITABLE_FIELDS),
            }),
        }
    }
}

/// Patch holding the listed fields whose serialized value changed.
pub fn diff_fields<T: Serialize>(before: &T, after: &T, fields: &[&str]) -> RecordPatch {
    let before = serde_json::to_value(before).unwrap_or(Value::Null);
    let after = serde_json::to_value(after).unwrap_or(Value::Null);

    let mut patch = RecordPatch::new();
    for field in fields {
        match after.get(field) {
            Some(value) if Some(value) != before.get(field) => patch.set(field, value),
            _ => {}
        }
    }
    patch
}
