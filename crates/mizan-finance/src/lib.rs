pub mod journal;
pub mod treasury;

pub use journal::{
    JournalEntryForm, JournalLineInput, JournalTotals, LineError, balance_tolerance, totals_of,
};
pub use treasury::{
    BankAccountForm, BankTransactionForm, CashAccountForm, TransactionFilter, TransactionSummary,
    TreasuryFilter, TreasurySummary,
};
