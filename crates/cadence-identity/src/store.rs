// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat JSON identity store.
//!
//! Registered users and their session tokens are kept in a single JSON file,
//! loaded once at startup and rewritten after every change. Writes go to a
//! sibling temp file first and are renamed into place so a crash mid-write
//! never leaves a truncated store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cadence_core::CadenceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identity key (hex digest of the caller identifier, or a
    /// random id for anonymous users).
    pub key: String,
    /// Display name used in replies and logs.
    pub display_name: String,
    /// When the user first appeared.
    pub registered_at: DateTime<Utc>,
}

/// On-disk shape of the identity store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// Identity key -> user record.
    #[serde(default)]
    users: HashMap<String, UserRecord>,
    /// Session token -> identity key.
    #[serde(default)]
    sessions: HashMap<String, String>,
}

/// File-backed registry of users and session tokens.
#[derive(Debug)]
pub struct IdentityStore {
    path: PathBuf,
    data: StoreFile,
}

impl IdentityStore {
    /// Open the store at `path`, loading existing records if the file exists.
    ///
    /// A missing file is an empty store. A corrupt file is replaced with an
    /// empty store after a warning rather than refusing to start.
    pub fn open(path: &Path) -> Result<Self, CadenceError> {
        let data = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "identity store unreadable, starting empty");
                    StoreFile::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => {
                return Err(CadenceError::Storage {
                    source: Box::new(e),
                });
            }
        };
        debug!(path = %path.display(), users = data.users.len(), "identity store opened");
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Look up a user by identity key.
    pub fn user(&self, key: &str) -> Option<&UserRecord> {
        self.data.users.get(key)
    }

    /// Resolve a session token to its identity key.
    pub fn session_owner(&self, token: &str) -> Option<&str> {
        self.data.sessions.get(token).map(String::as_str)
    }

    /// Insert or update a user record and persist.
    pub async fn put_user(&mut self, record: UserRecord) -> Result<(), CadenceError> {
        self.data.users.insert(record.key.clone(), record);
        self.persist().await
    }

    /// Bind a session token to an identity key and persist.
    pub async fn put_session(&mut self, token: &str, key: &str) -> Result<(), CadenceError> {
        self.data
            .sessions
            .insert(token.to_string(), key.to_string());
        self.persist().await
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.data.users.len()
    }

    /// Rewrite the store file without blocking the runtime.
    async fn persist(&self) -> Result<(), CadenceError> {
        let json = serde_json::to_string_pretty(&self.data).map_err(|e| CadenceError::Storage {
            source: Box::new(e),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| CadenceError::Storage {
                source: Box::new(e),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CadenceError::Storage {
                source: Box::new(e),
            })?;
        Ok(())
    }
}
