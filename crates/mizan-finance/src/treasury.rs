use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use mizan_core::{
    AccountType, BankAccount, BankTransaction, CashAccount, FieldErrors, RecordForm, RowFilter,
    Searchable, StatusFilter, TransactionStatus, TransactionType, term_matches,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_CURRENCY: &str = "SAR";
const ACCOUNT_REQUIRED: &str = "الحساب مطلوب";
const TRANSACTION_DATE_REQUIRED: &str = "تاريخ العملية مطلوب";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BankAccountForm {
    pub account_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub iban: String,
    pub currency: String,
    pub opening_balance: Decimal,
    /// Shown read-only once the account exists; never written from the form.
    pub current_balance: Decimal,
    pub is_active: bool,
}

impl Default for BankAccountForm {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            bank_name: String::new(),
            account_number: String::new(),
            iban: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            is_active: true,
        }
    }
}

impl BankAccountForm {
    pub fn from_record(account: &BankAccount) -> Self {
        Self {
            account_name: account.account_name.clone(),
            bank_name: account.bank_name.clone(),
            account_number: account.account_number.clone(),
            iban: account.iban.clone().unwrap_or_default(),
            currency: account.currency.clone(),
            opening_balance: account.opening_balance,
            current_balance: account.current_balance,
            is_active: account.is_active,
        }
    }
}

impl RecordForm for BankAccountForm {
    type Record = BankAccount;

    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "account_name",
        "bank_name",
        "account_number",
        "iban",
        "currency",
        "is_active",
    ];

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("account_name", &self.account_name, "اسم الحساب مطلوب");
        errors.require("bank_name", &self.bank_name, "اسم البنك مطلوب");
        errors.require("account_number", &self.account_number, "رقم الحساب مطلوب");
        validate_currency(&mut errors, &self.currency);
        validate_opening_balance(&mut errors, self.opening_balance);
        errors
    }

    fn build(
        &self,
        existing: Option<&BankAccount>,
        company_id: &str,
    ) -> Result<BankAccount, FieldErrors> {
        let now = Utc::now();
        let (opening_balance, current_balance) = balances(
            existing.map(|before| (before.opening_balance, before.current_balance)),
            self.opening_balance,
        );
        let iban = self.iban.trim();

        Ok(BankAccount {
            id: existing.map_or_else(Uuid::new_v4, |before| before.id),
            company_id: existing.map_or_else(
                || company_id.to_string(),
                |before| before.company_id.clone(),
            ),
            account_name: self.account_name.trim().to_string(),
            bank_name: self.bank_name.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            iban: (!iban.is_empty()).then(|| iban.to_ascii_uppercase()),
            currency: normalize_currency(&self.currency),
            opening_balance,
            current_balance,
            is_active: self.is_active,
            created_at: existing.map_or(now, |before| before.created_at),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CashAccountForm {
    pub account_name: String,
    pub custodian: String,
    pub location: String,
    pub currency: String,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub is_active: bool,
}

impl Default for CashAccountForm {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            custodian: String::new(),
            location: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            is_active: true,
        }
    }
}

impl CashAccountForm {
    pub fn from_record(account: &CashAccount) -> Self {
        Self {
            account_name: account.account_name.clone(),
            custodian: account.custodian.clone().unwrap_or_default(),
            location: account.location.clone().unwrap_or_default(),
            currency: account.currency.clone(),
            opening_balance: account.opening_balance,
            current_balance: account.current_balance,
            is_active: account.is_active,
        }
    }
}

impl RecordForm for CashAccountForm {
    type Record = CashAccount;

    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "account_name",
        "custodian",
        "location",
        "currency",
        "is_active",
    ];

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("account_name", &self.account_name, "اسم الصندوق مطلوب");
        validate_currency(&mut errors, &self.currency);
        validate_opening_balance(&mut errors, self.opening_balance);
        errors
    }

    fn build(
        &self,
        existing: Option<&CashAccount>,
        company_id: &str,
    ) -> Result<CashAccount, FieldErrors> {
        let now = Utc::now();
        let (opening_balance, current_balance) = balances(
            existing.map(|before| (before.opening_balance, before.current_balance)),
            self.opening_balance,
        );
        let custodian = self.custodian.trim();
        let location = self.location.trim();

        Ok(CashAccount {
            id: existing.map_or_else(Uuid::new_v4, |before| before.id),
            company_id: existing.map_or_else(
                || company_id.to_string(),
                |before| before.company_id.clone(),
            ),
            account_name: self.account_name.trim().to_string(),
            custodian: (!custodian.is_empty()).then(|| custodian.to_string()),
            location: (!location.is_empty()).then(|| location.to_string()),
            currency: normalize_currency(&self.currency),
            opening_balance,
            current_balance,
            is_active: self.is_active,
            created_at: existing.map_or(now, |before| before.created_at),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BankTransactionForm {
    pub account_id: Option<Uuid>,
    pub account_type: AccountType,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub related_account_id: Option<Uuid>,
    pub transaction_date: Option<NaiveDate>,
    pub reference: String,
    pub description: String,
    pub status: TransactionStatus,
}

impl Default for BankTransactionForm {
    fn default() -> Self {
        Self {
            account_id: None,
            account_type: AccountType::Bank,
            transaction_type: TransactionType::Deposit,
            amount: Decimal::ZERO,
            related_account_id: None,
            transaction_date: Some(Utc::now().date_naive()),
            reference: String::new(),
            description: String::new(),
            status: TransactionStatus::Pending,
        }
    }
}

impl BankTransactionForm {
    pub fn from_record(transaction: &BankTransaction) -> Self {
        Self {
            account_id: Some(transaction.account_id),
            account_type: transaction.account_type,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            related_account_id: transaction.related_account_id,
            transaction_date: Some(transaction.transaction_date),
            reference: transaction.reference.clone().unwrap_or_default(),
            description: transaction.description.clone().unwrap_or_default(),
            status: transaction.status,
        }
    }
}

impl RecordForm for BankTransactionForm {
    type Record = BankTransaction;

    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "account_id",
        "account_type",
        "transaction_type",
        "amount",
        "related_account_id",
        "transaction_date",
        "reference",
        "description",
        "status",
    ];

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.account_id.is_none() {
            errors.add("account_id", ACCOUNT_REQUIRED);
        }
        if self.amount <= Decimal::ZERO {
            errors.add("amount", "المبلغ يجب أن يكون أكبر من صفر");
        }
        if self.transaction_date.is_none() {
            errors.add("transaction_date", TRANSACTION_DATE_REQUIRED);
        }
        if self.transaction_type == TransactionType::Transfer {
            match self.related_account_id {
                None => errors.add("related_account_id", "الحساب المحول إليه مطلوب"),
                Some(related) if Some(related) == self.account_id => errors.add(
                    "related_account_id",
                    "لا يمكن التحويل إلى نفس الحساب",
                ),
                Some(_) => {}
            }
        }
        errors
    }

    fn build(
        &self,
        existing: Option<&BankTransaction>,
        company_id: &str,
    ) -> Result<BankTransaction, FieldErrors> {
        let account_id = FieldErrors::required("account_id", self.account_id, ACCOUNT_REQUIRED)?;
        let transaction_date = FieldErrors::required(
            "transaction_date",
            self.transaction_date,
            TRANSACTION_DATE_REQUIRED,
        )?;
        let now = Utc::now();
        let reference = self.reference.trim();
        let description = self.description.trim();
        let related_account_id = match self.transaction_type {
            TransactionType::Transfer => self.related_account_id,
            _ => None,
        };

        Ok(BankTransaction {
            id: existing.map_or_else(Uuid::new_v4, |before| before.id),
            company_id: existing.map_or_else(
                || company_id.to_string(),
                |before| before.company_id.clone(),
            ),
            account_id,
            account_type: self.account_type,
            transaction_type: self.transaction_type,
            amount: self.amount,
            related_account_id,
            transaction_date,
            reference: (!reference.is_empty()).then(|| reference.to_string()),
            description: (!description.is_empty()).then(|| description.to_string()),
            status: self.status,
            created_at: existing.map_or(now, |before| before.created_at),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreasuryFilter {
    pub term: String,
    pub status: StatusFilter,
    pub currency: Option<String>,
}

impl TreasuryFilter {
    fn currency_matches(&self, currency: &str) -> bool {
        self.currency
            .as_deref()
            .is_none_or(|wanted| wanted.trim().eq_ignore_ascii_case(currency))
    }
}

impl RowFilter<BankAccount> for TreasuryFilter {
    fn accepts(&self, row: &BankAccount) -> bool {
        self.status.accepts(row.is_active)
            && self.currency_matches(&row.currency)
            && term_matches(&self.term, |term| row.matches(term))
    }
}

impl RowFilter<CashAccount> for TreasuryFilter {
    fn accepts(&self, row: &CashAccount) -> bool {
        self.status.accepts(row.is_active)
            && self.currency_matches(&row.currency)
            && term_matches(&self.term, |term| row.matches(term))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransactionFilter {
    pub term: String,
    pub account_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
}

impl RowFilter<BankTransaction> for TransactionFilter {
    fn accepts(&self, row: &BankTransaction) -> bool {
        self.account_id.is_none_or(|wanted| {
            row.account_id == wanted || row.related_account_id == Some(wanted)
        }) && self
            .transaction_type
            .is_none_or(|wanted| wanted == row.transaction_type)
            && self.status.is_none_or(|wanted| wanted == row.status)
            && term_matches(&self.term, |term| row.matches(term))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreasurySummary {
    pub accounts: usize,
    pub active_accounts: usize,
    /// Current balance of active accounts, per currency.
    pub balances: BTreeMap<String, Decimal>,
}

impl TreasurySummary {
    pub fn from_bank_accounts(accounts: &[BankAccount]) -> Self {
        Self::collect(
            accounts
                .iter()
                .map(|a| (a.is_active, a.currency.as_str(), a.current_balance)),
        )
    }

    pub fn from_cash_accounts(accounts: &[CashAccount]) -> Self {
        Self::collect(
            accounts
                .iter()
                .map(|a| (a.is_active, a.currency.as_str(), a.current_balance)),
        )
    }

    fn collect<'a>(rows: impl Iterator<Item = (bool, &'a str, Decimal)>) -> Self {
        let mut summary = TreasurySummary::default();
        for (is_active, currency, balance) in rows {
            summary.accounts += 1;
            if is_active {
                summary.active_accounts += 1;
                *summary
                    .balances
                    .entry(currency.to_string())
                    .or_insert(Decimal::ZERO) += balance;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionSummary {
    pub count: usize,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub transfers: Decimal,
    /// Deposits minus withdrawals; cancelled transactions are excluded.
    pub net: Decimal,
}

impl TransactionSummary {
    pub fn from_records(records: &[BankTransaction]) -> Self {
        let mut summary = TransactionSummary {
            count: records.len(),
            ..TransactionSummary::default()
        };
        for transaction in records
            .iter()
            .filter(|t| t.status != TransactionStatus::Cancelled)
        {
            match transaction.transaction_type {
                TransactionType::Deposit => summary.deposits += transaction.amount,
                TransactionType::Withdrawal => summary.withdrawals += transaction.amount,
                TransactionType::Transfer => summary.transfers += transaction.amount,
            }
        }
        summary.net = summary.deposits - summary.withdrawals;
        summary
    }
}

/// Opening balance is fixed at creation and seeds the current balance once.
fn balances(existing: Option<(Decimal, Decimal)>, opening_input: Decimal) -> (Decimal, Decimal) {
    existing.unwrap_or((opening_input, opening_input))
}

fn normalize_currency(value: &str) -> String {
    let normalized = value.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        normalized
    }
}

fn validate_currency(errors: &mut FieldErrors, value: &str) {
    let normalized = value.trim();
    if !normalized.is_empty()
        && (normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()))
    {
        errors.add("currency", "رمز العملة يجب أن يتكون من 3 أحرف");
    }
}

fn validate_opening_balance(errors: &mut FieldErrors, opening_balance: Decimal) {
    if opening_balance < Decimal::ZERO {
        errors.add("opening_balance", "الرصيد الافتتاحي لا يمكن أن يكون سالباً");
    }
}
