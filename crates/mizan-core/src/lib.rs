pub mod codes;
pub mod error;
pub mod filter;
pub mod forms;
pub mod lifecycle;
pub mod models;
pub mod storage;

pub use codes::{EMPLOYEE_CODE_PREFIX, PROJECT_CODE_PREFIX, generate_code, is_generated_code};
pub use error::RecordError;
pub use filter::{RowFilter, StatusFilter, term_matches};
pub use forms::{FieldErrors, RecordForm, SaveRequest, diff_fields};
pub use lifecycle::{Lifecycle, LifecycleState, toggle_patch};
pub use models::{
    AccountRef, AccountType, BankAccount, BankTransaction, CashAccount, CustomerRef,
    DEFAULT_COMPANY_ID, Employee, EmployeeRef, JournalEntry, JournalLine, JournalStatus, Project,
    ProjectRef, ProjectStatus, SalaryType, TransactionStatus, TransactionType,
};
pub use storage::{Record, RecordPatch, RecordQuery, RecordStore, Searchable, StoreError};
