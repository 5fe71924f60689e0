// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory session store keyed by resolved user identity.
//!
//! A `DashMap` shards the per-user locks so chat turns from different users
//! never contend. Within one user, all loader and transcript mutation happens
//! under that user's `Mutex<UserState>`; scheduler tasks hold their own
//! `Arc<Mutex<Loader>>` handles and never touch the user lock.

use std::collections::VecDeque;
use std::sync::Arc;

use cadence_core::CadenceError;
use cadence_core::types::{LoaderKind, UserKey};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::loader::Loader;

/// Caps applied to per-user in-memory state.
#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub max_loaders_per_kind: usize,
    pub max_log_entries: usize,
    pub max_transcript_entries: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_loaders_per_kind: 16,
            max_log_entries: 500,
            max_transcript_entries: 500,
        }
    }
}

/// Who authored a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

/// One line of a user's chat transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub speaker: Speaker,
    pub text: String,
}

impl std::fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let who = match self.speaker {
            Speaker::User => "you",
            Speaker::Bot => "bot",
        };
        write!(
            f,
            "[{}] {who}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.text
        )
    }
}

/// All mutable state for one user.
#[derive(Debug, Default)]
pub struct UserState {
    loaders: Vec<Arc<Mutex<Loader>>>,
    transcript: VecDeque<TranscriptEntry>,
    /// Monotonic counter assigning creation order across both loader kinds.
    next_seq: u64,
    /// Per-kind counters assigning the one-based `index`.
    next_index_post: usize,
    next_index_convo: usize,
}

impl UserState {
    /// Create a new loader of the given kind, enforcing the per-kind cap.
    ///
    /// Returns the shared handle; the loader starts in the token-collection
    /// state and becomes the user's most recently created loader.
    pub async fn create_loader(
        &mut self,
        kind: LoaderKind,
        limits: &StoreLimits,
    ) -> Result<Arc<Mutex<Loader>>, CadenceError> {
        let mut count = 0usize;
        for handle in &self.loaders {
            if handle.lock().await.kind == kind {
                count += 1;
            }
        }
        if count >= limits.max_loaders_per_kind {
            return Err(CadenceError::Validation(format!(
                "limit of {} {kind} loaders reached; stop one before creating another",
                limits.max_loaders_per_kind
            )));
        }

        let index = match kind {
            LoaderKind::Post => {
                self.next_index_post += 1;
                self.next_index_post
            }
            LoaderKind::Convo => {
                self.next_index_convo += 1;
                self.next_index_convo
            }
        };
        let seq = self.next_seq;
        self.next_seq += 1;

        let handle = Arc::new(Mutex::new(Loader::new(
            kind,
            index,
            seq,
            limits.max_log_entries,
        )));
        self.loaders.push(handle.clone());
        debug!(%kind, index, "loader created");
        Ok(handle)
    }

    /// The most recently created loader that is still collecting input, if
    /// any. This is the loader free-text chat turns feed.
    pub async fn collecting_loader(&self) -> Option<Arc<Mutex<Loader>>> {
        let mut best: Option<(u64, Arc<Mutex<Loader>>)> = None;
        for handle in &self.loaders {
            let loader = handle.lock().await;
            if !loader.is_collecting() {
                continue;
            }
            if best.as_ref().is_none_or(|(seq, _)| loader.seq > *seq) {
                best = Some((loader.seq, handle.clone()));
            }
        }
        best.map(|(_, handle)| handle)
    }

    /// The most recently created loader of the kind, if any.
    pub async fn current_loader(&self, kind: LoaderKind) -> Option<Arc<Mutex<Loader>>> {
        let mut best: Option<(u64, Arc<Mutex<Loader>>)> = None;
        for handle in &self.loaders {
            let loader = handle.lock().await;
            if loader.kind != kind {
                continue;
            }
            if best.as_ref().is_none_or(|(seq, _)| loader.seq > *seq) {
                best = Some((loader.seq, handle.clone()));
            }
        }
        best.map(|(_, handle)| handle)
    }

    /// Look up a loader by kind and one-based index.
    pub async fn loader_at(&self, kind: LoaderKind, index: usize) -> Option<Arc<Mutex<Loader>>> {
        for handle in &self.loaders {
            let loader = handle.lock().await;
            if loader.kind == kind && loader.index == index {
                return Some(handle.clone());
            }
        }
        None
    }

    /// All loader handles, in creation order.
    pub fn loaders(&self) -> &[Arc<Mutex<Loader>>] {
        &self.loaders
    }

    /// Append a transcript line, dropping the oldest when the cap is reached.
    pub fn push_transcript(&mut self, speaker: Speaker, text: String, limits: &StoreLimits) {
        if self.transcript.len() >= limits.max_transcript_entries {
            self.transcript.pop_front();
        }
        self.transcript.push_back(TranscriptEntry {
            timestamp: Utc::now(),
            speaker,
            text,
        });
    }

    /// Drop the whole transcript. Loader state is untouched.
    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Transcript lines, oldest first.
    pub fn transcript(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.transcript.iter()
    }
}

/// Concurrent session store: one `UserState` per resolved identity.
pub struct SessionStore {
    users: DashMap<UserKey, Arc<Mutex<UserState>>>,
    limits: StoreLimits,
}

impl SessionStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            users: DashMap::new(),
            limits,
        }
    }

    /// Fetch the state handle for a user, creating empty state on first
    /// contact.
    pub fn get_or_create(&self, key: &UserKey) -> Arc<Mutex<UserState>> {
        self.users
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(UserState::default())))
            .clone()
    }

    /// Fetch the state handle for a user if they have one.
    pub fn get(&self, key: &UserKey) -> Option<Arc<Mutex<UserState>>> {
        self.users.get(key).map(|entry| entry.clone())
    }

    /// The configured state caps.
    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Number of users with session state.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}
