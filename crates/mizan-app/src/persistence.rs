use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::settings::AppSettings;
use crate::state::{Action, AppState, StateError, User};

pub const KEY_IS_AUTHENTICATED: &str = "isAuthenticated";
pub const KEY_CURRENT_USER: &str = "currentUser";
pub const KEY_APP_SETTINGS: &str = "appSettings";

/// String key/value storage, the local-storage analogue.
pub trait StateStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StateError>;
    fn remove(&self, key: &str) -> Result<(), StateError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StateError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes beside the target and renames over it, so readers never see a
    /// half-written file.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StateError> {
        let encoded = serde_json::to_string_pretty(entries)?;
        let staging = self.staging_path();
        fs::write(&staging, encoded)?;
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let _lock = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let _lock = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        let _lock = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Owns the application state and writes it through on every dispatch.
pub struct StateStore<S> {
    state: AppState,
    storage: S,
}

impl<S: StateStorage> StateStore<S> {
    /// Restores persisted state. Unreadable or invalid entries fall back to
    /// defaults instead of failing.
    pub fn init(storage: S) -> Self {
        let mut state = AppState::default();

        if let Some(user) = restore_session(&storage) {
            state.is_authenticated = true;
            state.current_user = Some(user);
        }
        state.settings = restore_settings(&storage);

        Self { state, storage }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.state.has_permission(permission)
    }

    /// Reduces into a copy and only adopts it once every touched key has
    /// been written. A storage failure leaves the held state unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<(), StateError> {
        let mut next = self.state.clone();
        let changed = next.reduce(action);

        if changed.session {
            self.storage.set(
                KEY_IS_AUTHENTICATED,
                if next.is_authenticated { "true" } else { "false" },
            )?;
            match &next.current_user {
                Some(user) => self
                    .storage
                    .set(KEY_CURRENT_USER, &serde_json::to_string(user)?)?,
                None => self.storage.remove(KEY_CURRENT_USER)?,
            }
        }
        if changed.settings {
            self.storage
                .set(KEY_APP_SETTINGS, &serde_json::to_string(&next.settings)?)?;
        }
        if changed.session || changed.settings {
            debug!(session = changed.session, settings = changed.settings, "state persisted");
        }
        self.state = next;
        Ok(())
    }
}

fn restore_session<S: StateStorage>(storage: &S) -> Option<User> {
    let authenticated = match storage.get(KEY_IS_AUTHENTICATED) {
        Ok(flag) => flag.as_deref() == Some("true"),
        Err(err) => {
            warn!("could not read {KEY_IS_AUTHENTICATED}: {err}");
            false
        }
    };
    if !authenticated {
        return None;
    }

    match storage.get(KEY_CURRENT_USER) {
        Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("discarding unreadable {KEY_CURRENT_USER}: {err}");
                None
            }
        },
        Ok(None) => {
            warn!("{KEY_IS_AUTHENTICATED} set without {KEY_CURRENT_USER}; starting signed out");
            None
        }
        Err(err) => {
            warn!("could not read {KEY_CURRENT_USER}: {err}");
            None
        }
    }
}

fn restore_settings<S: StateStorage>(storage: &S) -> AppSettings {
    let raw = match storage.get(KEY_APP_SETTINGS) {
        Ok(Some(raw)) => raw,
        Ok(None) => return AppSettings::default(),
        Err(err) => {
            warn!("could not read {KEY_APP_SETTINGS}: {err}");
            return AppSettings::default();
        }
    };

    match serde_json::from_str::<AppSettings>(&raw) {
        Ok(settings) if settings.is_valid() => settings,
        Ok(settings) => {
            warn!(
                problems = ?settings.problems(),
                "persisted settings out of range; using defaults"
            );
            AppSettings::default()
        }
        Err(err) => {
            warn!("discarding unreadable {KEY_APP_SETTINGS}: {err}");
            AppSettings::default()
        }
    }
}
