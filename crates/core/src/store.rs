//! Named credential storage with per-entry expiry
//!
//! Entries behave like browser cookies: the expiry is fixed when the value is
//! written, a TTL of zero means "no expiry" and a negative TTL evicts the entry.
//! Reads past the expiry see nothing.

use crate::issuer::CredentialPair;
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Name of the access token entry
pub const ACCESS_TOKEN: &str = "accessToken";

/// Name of the refresh token entry
pub const REFRESH_TOKEN: &str = "refreshToken";

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Storage for the current credential pair
pub trait CredentialStore: Send + Sync {
    /// Store `value` under `name`, replacing any previous value
    ///
    /// `ttl_days` may be fractional, e.g. `1.0 / 24.0` for one hour.
    fn set(&self, name: &str, value: &str, ttl_days: f64) -> Result<()>;

    /// The stored value, unless it is missing or past its expiry
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Drop the entry if present
    fn remove(&self, name: &str) -> Result<()>;
}

/// Lifetimes, in days, used when a credential pair is written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenLifetimes {
    pub access_days: f64,
    pub refresh_days: f64,
}

impl TokenLifetimes {
    /// Lifetimes after a refresh: one hour and seven days
    pub const REFRESHED: Self = Self {
        access_days: 1.0 / 24.0,
        refresh_days: 7.0,
    };

    /// Lifetimes after a password login
    pub fn for_login(remember_me: bool) -> Self {
        if remember_me {
            Self {
                access_days: 7.0,
                refresh_days: 30.0,
            }
        } else {
            Self::REFRESHED
        }
    }
}

/// Write both tokens of `pair`
pub fn store_pair(
    store: &dyn CredentialStore,
    pair: &CredentialPair,
    lifetimes: TokenLifetimes,
) -> Result<()> {
    store.set(ACCESS_TOKEN, &pair.access_token, lifetimes.access_days)?;
    store.set(REFRESH_TOKEN, &pair.refresh_token, lifetimes.refresh_days)
}

/// Remove both tokens
pub fn logout(store: &dyn CredentialStore) -> Result<()> {
    store.remove(ACCESS_TOKEN)?;
    store.remove(REFRESH_TOKEN)
}

/// A stored value together with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    pub fn new(value: impl Into<String>, ttl_days: f64, now: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: expiry_after(ttl_days, now),
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

fn expiry_after(ttl_days: f64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if ttl_days == 0.0 || ttl_days.is_nan() {
        return None;
    }
    let millis = (ttl_days * MILLIS_PER_DAY).round() as i64;
    TimeDelta::try_milliseconds(millis).and_then(|ttl| now.checked_add_signed(ttl))
}

/// Process-local store
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<Mutex<HashMap<String, StoredEntry>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry including its expiry, even if already expired
    pub fn entry(&self, name: &str) -> Result<Option<StoredEntry>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredEntry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Store("credential map lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set(&self, name: &str, value: &str, ttl_days: f64) -> Result<()> {
        let mut entries = self.lock()?;
        if ttl_days < 0.0 {
            entries.remove(name);
        } else {
            entries.insert(name.to_string(), StoredEntry::new(value, ttl_days, Utc::now()));
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        let mut entries = self.lock()?;
        match entries.get(name) {
            Some(entry) if entry.is_live(Utc::now()) => Ok(Some(entry.value.clone())),
            Some(_) => {
                debug!("Evicting expired credential '{}'", name);
                entries.remove(name);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.lock()?.remove(name);
        Ok(())
    }
}

/// Store persisted as a JSON document on disk
///
/// The file is re-read on every access so that several processes sharing it
/// observe each other's writes. Within one process writes are serialized.
#[derive(Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// `credentials.json` in the platform data directory
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("dev", "authfetch", "authfetch") {
            Some(dirs) => dirs.data_dir().join("credentials.json"),
            None => {
                warn!("Failed to determine platform data directory, using ./data");
                PathBuf::from("./data/credentials.json")
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, StoredEntry>> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, StoredEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut HashMap<String, StoredEntry>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Store("credential file lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        let now = Utc::now();
        entries.retain(|_, entry| entry.is_live(now));
        apply(&mut entries);
        self.save(&entries)
    }
}

impl CredentialStore for FileCredentialStore {
    fn set(&self, name: &str, value: &str, ttl_days: f64) -> Result<()> {
        self.update(|entries| {
            if ttl_days < 0.0 {
                entries.remove(name);
            } else {
                entries.insert(name.to_string(), StoredEntry::new(value, ttl_days, Utc::now()));
            }
        })
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        let entries = self.load()?;
        Ok(entries
            .get(name)
            .filter(|entry| entry.is_live(Utc::now()))
            .map(|entry| entry.value.clone()))
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(name);
        })
    }
}
