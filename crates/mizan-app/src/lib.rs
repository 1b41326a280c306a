pub mod in_flight;
pub mod list;
pub mod messages;
pub mod persistence;
pub mod ports;
pub mod settings;
pub mod state;

pub use in_flight::{InFlight, InFlightGuard};
pub use list::{ListStatus, LoadFailureKind, LoadMode, RecordList};
pub use persistence::{
    FileStorage, KEY_APP_SETTINGS, KEY_CURRENT_USER, KEY_IS_AUTHENTICATED, MemoryStorage,
    StateStorage, StateStore,
};
pub use ports::{AutoConfirm, Confirmer, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use settings::AppSettings;
pub use state::{Action, AppState, Changed, StateError, User, UserRole};
