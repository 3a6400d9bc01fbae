use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::constants::storage_keys;

/// Flat key/value record as it sits in durable storage.
pub type StoredFields = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage at {path} is not a JSON object of strings: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable place the five session fields live in.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read everything stored. Nothing stored yet is an empty map.
    async fn load(&self) -> Result<StoredFields, StorageError>;

    /// Replace the stored record.
    async fn save(&self, fields: &StoredFields) -> Result<(), StorageError>;

    /// Remove the stored record. Removing nothing is not an error.
    async fn remove(&self) -> Result<(), StorageError>;
}

/// JSON file storage. Writes go to a sibling temp file which is then renamed
/// over the target, so a reader never sees half a record.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> Result<StoredFields, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoredFields::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, fields: &StoredFields) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec_pretty(fields).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "Session record written");
        Ok(())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process storage for tests and embedding. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    fields: Arc<Mutex<StoredFields>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `fields`.
    #[must_use]
    pub fn with_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            fields: Arc::new(Mutex::new(fields)),
        }
    }

    /// Copy of what is currently stored.
    #[must_use]
    pub fn snapshot(&self) -> StoredFields {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<StoredFields, StorageError> {
        Ok(self.snapshot())
    }

    async fn save(&self, fields: &StoredFields) -> Result<(), StorageError> {
        *self.fields.lock().unwrap_or_else(PoisonError::into_inner) = fields.clone();
        Ok(())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// Admin role as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    Admin,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "SuperAdmin" => Self::SuperAdmin,
            "Admin" => Self::Admin,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Admin => "Admin",
            Self::Other(s) => s,
        }
    }

    /// SuperAdmin and Admin go to the privileged dashboard.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged-in admin.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
    pub role: Role,
    pub username: String,
    pub id: String,
}

// Keep the bearer token out of logs.
impl fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSession")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .field("username", &self.username)
            .field("id", &self.id)
            .finish()
    }
}

impl AdminSession {
    fn to_fields(&self) -> StoredFields {
        [
            (storage_keys::TOKEN, self.token.as_str()),
            (storage_keys::ROLE, self.role.as_str()),
            (storage_keys::USERNAME, self.username.as_str()),
            (storage_keys::ID, self.id.as_str()),
            (storage_keys::LOGGED_IN, "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Rebuild a session from storage. Anything short of all five fields,
    /// with a non-empty token and the logged-in flag set, is `None`.
    fn from_fields(fields: &StoredFields) -> Option<Self> {
        let get = |key: &str| fields.get(key).cloned();
        let token = get(storage_keys::TOKEN).filter(|t| !t.is_empty())?;
        let role = get(storage_keys::ROLE)?;
        let username = get(storage_keys::USERNAME)?;
        let id = get(storage_keys::ID)?;
        if get(storage_keys::LOGGED_IN).as_deref() != Some("true") {
            return None;
        }
        Some(Self {
            token,
            role: Role::parse(&role),
            username,
            id,
        })
    }
}

/// The one owner of the admin session.
///
/// Storage is read once in [`SessionStore::init`]; afterwards the current
/// value lives in a watch channel and writes go through an async mutex so
/// storage and subscribers never disagree.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    write_lock: tokio::sync::Mutex<()>,
    current: watch::Sender<Option<AdminSession>>,
}

impl SessionStore {
    /// Load the stored session. An incomplete record is cleared and the store
    /// starts anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read, or an incomplete or
    /// unreadable record cannot be removed.
    pub async fn init(storage: impl SessionStorage + 'static) -> Result<Self, StorageError> {
        let fields = match storage.load().await {
            Ok(fields) => fields,
            Err(StorageError::Malformed { path, source }) => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "Discarding unreadable admin session record"
                );
                storage.remove().await?;
                StoredFields::new()
            }
            Err(e) => return Err(e),
        };
        let session = AdminSession::from_fields(&fields);

        if session.is_none() && !fields.is_empty() {
            warn!(
                keys = ?fields.keys().collect::<Vec<_>>(),
                "Discarding incomplete admin session record"
            );
            storage.remove().await?;
        }
        if let Some(s) = &session {
            debug!(username = %s.username, role = %s.role, "Restored admin session");
        }

        let (current, _) = watch::channel(session);
        Ok(Self {
            storage: Box::new(storage),
            write_lock: tokio::sync::Mutex::new(()),
            current,
        })
    }

    /// Current session, if any.
    #[must_use]
    pub fn read(&self) -> Option<AdminSession> {
        self.current.borrow().clone()
    }

    /// Persist all five fields, then publish.
    ///
    /// # Errors
    ///
    /// Returns an error if storage rejects the write; the published value is
    /// left unchanged in that case.
    pub async fn write(&self, session: AdminSession) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.storage.save(&session.to_fields()).await?;
        info!(username = %session.username, role = %session.role, "Admin session stored");
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Remove all five fields, then publish the anonymous state.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be cleared.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.storage.remove().await?;
        if self.current.send_replace(None).is_some() {
            info!("Admin session cleared");
        }
        Ok(())
    }

    /// Observe session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AdminSession>> {
        self.current.subscribe()
    }
}
