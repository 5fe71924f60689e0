// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution for inbound chat requests.
//!
//! Every request carries at most an opaque identifier (anything the caller
//! uses to name themselves) and/or a session token from an earlier reply.
//! Resolution order: known session token first, then identifier, then an
//! anonymous pseudo-identity unless `require_identifier` is set.

use std::path::Path;

use cadence_core::CadenceError;
use cadence_core::types::{SessionToken, UserKey};
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::names::generate_pseudonym;
use crate::store::{IdentityStore, UserRecord};

/// Credentials extracted from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Caller-supplied identifier, hashed into the identity key.
    pub identifier: Option<String>,
    /// Session token from a previous reply.
    pub session: Option<SessionToken>,
}

/// The resolved identity for one request.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    /// Stable key into the session store.
    pub key: UserKey,
    /// Display name for replies and logs.
    pub display_name: String,
    /// Token the client should present on subsequent requests. `None` when
    /// the client authenticated with a token that is already valid.
    pub issued_session: Option<SessionToken>,
}

/// Resolves request credentials to stable user identities.
pub struct IdentityResolver {
    store: Mutex<IdentityStore>,
    require_identifier: bool,
}

impl IdentityResolver {
    /// Open the resolver over the identity store at `path`.
    pub fn open(path: &Path, require_identifier: bool) -> Result<Self, CadenceError> {
        Ok(Self {
            store: Mutex::new(IdentityStore::open(path)?),
            require_identifier,
        })
    }

    /// Resolve request credentials to an identity, registering new users.
    ///
    /// The same identifier always maps to the same key, so a caller who
    /// reconnects without their session token still lands in their session.
    pub async fn resolve(
        &self,
        credentials: &RequestCredentials,
    ) -> Result<ResolvedIdentity, CadenceError> {
        let mut store = self.store.lock().await;

        // A known session token wins outright.
        if let Some(token) = &credentials.session
            && let Some(key) = store.session_owner(&token.0).map(str::to_string)
            && let Some(record) = store.user(&key)
        {
            return Ok(ResolvedIdentity {
                key: UserKey(record.key.clone()),
                display_name: record.display_name.clone(),
                issued_session: None,
            });
        }

        if let Some(identifier) = &credentials.identifier {
            let key = identity_key(identifier);
            if store.user(&key).is_none() {
                let record = UserRecord {
                    key: key.clone(),
                    display_name: generate_pseudonym(),
                    registered_at: Utc::now(),
                };
                info!(key = %record.key, name = %record.display_name, "registered new user");
                store.put_user(record).await?;
            }
            let display_name = store
                .user(&key)
                .map(|r| r.display_name.clone())
                .ok_or_else(|| CadenceError::Internal("identity vanished after insert".into()))?;
            let token = mint_session_token();
            store.put_session(&token.0, &key).await?;
            debug!(key = %key, "session issued for identifier");
            return Ok(ResolvedIdentity {
                key: UserKey(key),
                display_name,
                issued_session: Some(token),
            });
        }

        if self.require_identifier {
            return Err(CadenceError::IdentityRequired);
        }

        // Anonymous caller: mint a fresh identity bound to a new session
        // token. Losing the token means losing the session.
        let key = Uuid::new_v4().to_string();
        let record = UserRecord {
            key: key.clone(),
            display_name: generate_pseudonym(),
            registered_at: Utc::now(),
        };
        let display_name = record.display_name.clone();
        info!(key = %key, name = %display_name, "registered anonymous user");
        store.put_user(record).await?;
        let token = mint_session_token();
        store.put_session(&token.0, &key).await?;
        Ok(ResolvedIdentity {
            key: UserKey(key),
            display_name,
            issued_session: Some(token),
        })
    }

    /// Resolve credentials to an existing identity without registering
    /// anything. Unknown callers get `None` and the store is never written.
    pub async fn lookup(&self, credentials: &RequestCredentials) -> Option<ResolvedIdentity> {
        let store = self.store.lock().await;

        if let Some(token) = &credentials.session
            && let Some(key) = store.session_owner(&token.0).map(str::to_string)
            && let Some(record) = store.user(&key)
        {
            return Some(ResolvedIdentity {
                key: UserKey(record.key.clone()),
                display_name: record.display_name.clone(),
                issued_session: None,
            });
        }

        if let Some(identifier) = &credentials.identifier {
            let key = identity_key(identifier);
            if let Some(record) = store.user(&key) {
                return Some(ResolvedIdentity {
                    key: UserKey(key),
                    display_name: record.display_name.clone(),
                    issued_session: None,
                });
            }
        }

        None
    }
}

/// Derive the stable identity key for an identifier.
///
/// Hashing keeps raw identifiers (emails, phone numbers, whatever callers
/// send) out of the store and the logs.
fn identity_key(identifier: &str) -> String {
    let digest = Sha256::digest(identifier.trim().as_bytes());
    hex::encode(digest)
}

fn mint_session_token() -> SessionToken {
    SessionToken(Uuid::new_v4().to_string())
}
