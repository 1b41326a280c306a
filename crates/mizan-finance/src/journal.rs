use chrono::{NaiveDate, Utc};
use mizan_core::{AccountRef, FieldErrors, JournalEntry, JournalLine, JournalStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Debits and credits closer than this are considered equal.
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct JournalTotals {
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub difference: Decimal,
    pub balanced: bool,
}

pub fn totals_of(amounts: impl IntoIterator<Item = (Decimal, Decimal)>) -> JournalTotals {
    let (total_debit, total_credit) = amounts
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), (d, c)| {
            (debit + d, credit + c)
        });
    let difference = total_debit - total_credit;

    JournalTotals {
        total_debit,
        total_credit,
        difference,
        balanced: difference.abs() < balance_tolerance(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalLineInput {
    pub account_id: Option<Uuid>,
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("a journal entry needs at least one line")]
    LastLine,
    #[error("line {0} does not exist")]
    OutOfRange(usize),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct JournalEntryInput {
    entry_number: String,
    date: Option<NaiveDate>,
    reference: String,
    description: String,
    status: JournalStatus,
    lines: Vec<JournalLineInput>,
}

/// Editable journal entry. Always holds at least one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "JournalEntryInput")]
pub struct JournalEntryForm {
    pub entry_number: String,
    pub date: Option<NaiveDate>,
    pub reference: String,
    pub description: String,
    pub status: JournalStatus,
    lines: Vec<JournalLineInput>,
}

impl From<JournalEntryInput> for JournalEntryForm {
    fn from(input: JournalEntryInput) -> Self {
        let mut lines = input.lines;
        if lines.is_empty() {
            lines.push(JournalLineInput::default());
        }
        Self {
            entry_number: input.entry_number,
            date: input.date,
            reference: input.reference,
            description: input.description,
            status: input.status,
            lines,
        }
    }
}

impl Default for JournalEntryForm {
    fn default() -> Self {
        JournalEntryInput::default().into()
    }
}

impl JournalEntryForm {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn from_entry(entry: &JournalEntry) -> Self {
        JournalEntryInput {
            entry_number: entry.entry_number.clone().unwrap_or_default(),
            date: Some(entry.date),
            reference: entry.reference.clone(),
            description: entry.description.clone(),
            status: entry.status,
            lines: entry
                .lines
                .iter()
                .map(|line| JournalLineInput {
                    account_id: line.account_id,
                    account_name: line.account_name.clone(),
                    debit: line.debit,
                    credit: line.credit,
                    description: line.description.clone(),
                })
                .collect(),
        }
        .into()
    }

    pub fn lines(&self) -> &[JournalLineInput] {
        &self.lines
    }

    /// Appends an empty line and returns its index.
    pub fn add_line(&mut self) -> usize {
        self.lines.push(JournalLineInput::default());
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Result<JournalLineInput, LineError> {
        if index >= self.lines.len() {
            return Err(LineError::OutOfRange(index));
        }
        if self.lines.len() == 1 {
            return Err(LineError::LastLine);
        }
        Ok(self.lines.remove(index))
    }

    /// Picks the account for a line and refreshes its cached display name.
    pub fn set_line_account(
        &mut self,
        index: usize,
        account_id: Option<Uuid>,
        accounts: &[AccountRef],
    ) -> Result<(), LineError> {
        let line = self.line_mut(index)?;
        line.account_id = account_id;
        line.account_name = account_id
            .and_then(|id| accounts.iter().find(|account| account.id == id))
            .map(|account| format!("{} - {}", account.code, account.name))
            .unwrap_or_default();
        Ok(())
    }

    pub fn set_line_amounts(
        &mut self,
        index: usize,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<(), LineError> {
        let line = self.line_mut(index)?;
        line.debit = debit;
        line.credit = credit;
        Ok(())
    }

    pub fn set_line_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<(), LineError> {
        self.line_mut(index)?.description = description.into();
        Ok(())
    }

    pub fn totals(&self) -> JournalTotals {
        totals_of(self.lines.iter().map(|line| (line.debit, line.credit)))
    }

    pub fn total_debit(&self) -> Decimal {
        self.totals().total_debit
    }

    pub fn total_credit(&self) -> Decimal {
        self.totals().total_credit
    }

    pub fn is_balanced(&self) -> bool {
        self.totals().balanced
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("reference", &self.reference, "المرجع مطلوب");
        errors.require("description", &self.description, "البيان مطلوب");
        if self.date.is_none() {
            errors.add("date", "التاريخ مطلوب");
        }
        for (index, line) in self.lines.iter().enumerate() {
            if line.debit < Decimal::ZERO {
                errors.add(&format!("lines[{index}].debit"), "المبلغ لا يمكن أن يكون سالباً");
            }
            if line.credit < Decimal::ZERO {
                errors.add(&format!("lines[{index}].credit"), "المبلغ لا يمكن أن يكون سالباً");
            }
        }
        if !self.is_balanced() {
            errors.add("lines", "القيد غير متوازن: مجموع المدين لا يساوي مجموع الدائن");
        }
        errors
    }

    /// Hands the entry to `on_save` only when it validates.
    pub fn submit<F, R>(&self, company_id: &str, on_save: F) -> Result<R, FieldErrors>
    where
        F: FnOnce(JournalEntry) -> R,
    {
        let errors = self.validate();
        let Some(date) = self.date.filter(|_| errors.is_empty()) else {
            let totals = self.totals();
            warn!(
                debit = %totals.total_debit,
                credit = %totals.total_credit,
                "journal entry rejected: {errors}"
            );
            return Err(errors);
        };

        let entry = self.to_entry(company_id, date);
        debug!(reference = %entry.reference, lines = entry.lines.len(), "journal entry accepted");
        Ok(on_save(entry))
    }

    fn to_entry(&self, company_id: &str, date: NaiveDate) -> JournalEntry {
        let now = Utc::now();
        let totals = self.totals();
        let entry_number = self.entry_number.trim();

        JournalEntry {
            id: Uuid::new_v4(),
            company_id: company_id.to_string(),
            entry_number: (!entry_number.is_empty()).then(|| entry_number.to_string()),
            date,
            reference: self.reference.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            lines: self
                .lines
                .iter()
                .map(|line| JournalLine {
                    account_id: line.account_id,
                    account_name: line.account_name.clone(),
                    debit: line.debit,
                    credit: line.credit,
                    description: line.description.trim().to_string(),
                })
                .collect(),
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            created_at: now,
        }
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut JournalLineInput, LineError> {
        self.lines
            .get_mut(index)
            .ok_or(LineError::OutOfRange(index))
    }
}

#[cfg(test)]
mod tests {
    use mizan_core::DEFAULT_COMPANY_ID;

    use super::*;

    fn form_with(amounts: &[(i64, i64)]) -> JournalEntryForm {
        let mut form = JournalEntryForm::new(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        form.reference = "INV-1001".to_string();
        form.description = "تحصيل فاتورة".to_string();
        for (index, (debit, credit)) in amounts.iter().enumerate() {
            if index > 0 {
                form.add_line();
            }
            form.set_line_amounts(index, Decimal::from(*debit), Decimal::from(*credit))
                .unwrap();
        }
        form
    }

    #[test]
    fn equal_debit_and_credit_is_balanced() {
        let form = form_with(&[(100, 0), (0, 100)]);
        let totals = form.totals();

        assert!(form.is_balanced());
        assert_eq!(totals.total_debit, Decimal::from(100));
        assert_eq!(totals.total_credit, Decimal::from(100));
        assert_eq!(totals.difference, Decimal::ZERO);
    }

    #[test]
    fn unbalanced_entry_never_reaches_save() {
        let form = form_with(&[(100, 0), (0, 50)]);
        let mut saved = false;

        let result = form.submit(DEFAULT_COMPANY_ID, |_| saved = true);

        assert!(!form.is_balanced());
        assert!(result.unwrap_err().contains("lines"));
        assert!(!saved);
    }

    #[test]
    fn tolerance_is_one_cent_exclusive() {
        let within = totals_of([(Decimal::new(10_000, 2), Decimal::new(99_995, 3))]);
        assert!(within.balanced);

        let at_limit = totals_of([(Decimal::new(10_000, 2), Decimal::new(9_999, 2))]);
        assert!(!at_limit.balanced);
    }

    #[test]
    fn reference_and_description_are_required() {
        let mut form = form_with(&[(100, 0), (0, 100)]);
        form.reference.clear();
        form.description = "   ".to_string();
        let mut saved = false;

        let errors = form.submit(DEFAULT_COMPANY_ID, |_| saved = true).unwrap_err();

        assert!(errors.contains("reference"));
        assert!(errors.contains("description"));
        assert!(!saved);
    }

    #[test]
    fn balanced_entry_is_saved_with_totals() {
        let form = form_with(&[(250, 0), (0, 200), (0, 50)]);
        let entry = form.submit(DEFAULT_COMPANY_ID, |entry| entry).unwrap();

        assert_eq!(entry.lines.len(), 3);
        assert_eq!(entry.total_debit, Decimal::from(250));
        assert_eq!(entry.total_credit, Decimal::from(250));
        assert_eq!(entry.status, JournalStatus::Draft);
    }

    #[test]
    fn entry_keeps_the_chosen_date_and_refuses_a_missing_one() {
        let mut form = form_with(&[(100, 0), (0, 100)]);
        let chosen = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        form.date = Some(chosen);
        let entry = form.submit(DEFAULT_COMPANY_ID, |entry| entry).unwrap();
        assert_eq!(entry.date, chosen);

        form.date = None;
        let mut saved = false;
        let errors = form.submit(DEFAULT_COMPANY_ID, |_| saved = true).unwrap_err();
        assert!(errors.contains("date"));
        assert!(!saved);
    }

    #[test]
    fn last_line_cannot_be_removed() {
        let mut form = JournalEntryForm::default();
        assert_eq!(form.lines().len(), 1);
        assert_eq!(form.remove_line(0), Err(LineError::LastLine));

        form.add_line();
        assert!(form.remove_line(1).is_ok());
        assert_eq!(form.remove_line(5), Err(LineError::OutOfRange(5)));
    }

    #[test]
    fn account_change_refreshes_name_but_not_totals() {
        let cash = AccountRef {
            id: Uuid::new_v4(),
            code: "1000".to_string(),
            name: "الصندوق".to_string(),
        };
        let mut form = form_with(&[(100, 0), (0, 100)]);
        let before = form.totals();

        form.set_line_account(0, Some(cash.id), std::slice::from_ref(&cash))
            .unwrap();
        assert_eq!(form.lines()[0].account_name, "1000 - الصندوق");
        assert_eq!(form.totals(), before);

        form.set_line_account(0, None, &[cash]).unwrap();
        assert!(form.lines()[0].account_name.is_empty());
    }

    #[test]
    fn negative_amounts_are_field_errors() {
        let form = form_with(&[(-10, 0), (0, -10)]);
        let errors = form.validate();
        assert!(errors.contains("lines[0].debit"));
        assert!(errors.contains("lines[1].credit"));
    }

    #[test]
    fn deserialized_form_always_has_a_line() {
        let form: JournalEntryForm =
            serde_json::from_str(r#"{"reference":"R","description":"D","lines":[]}"#).unwrap();
        assert_eq!(form.lines().len(), 1);
    }
}
