// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loader state: one recurring-post job being configured or running.
//!
//! A loader moves through the collection states in [`Awaiting`] as the user
//! supplies credentials, a target, messages, and a delay over chat turns.
//! Once running, the scheduler task holds a clone of the loader handle and
//! appends delivery log entries until cancelled or finished.

use std::collections::VecDeque;

use cadence_core::types::{Awaiting, Credential, LoaderKind, LogEntry, LogQuery};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// A single recurring-post job for one user.
#[derive(Debug)]
pub struct Loader {
    /// Which flavor of loader this is.
    pub kind: LoaderKind,
    /// One-based position among the user's loaders of this kind. Stable for
    /// the session lifetime; used by `stop loader N` and `console N`.
    pub index: usize,
    /// Creation order across ALL of the user's loaders, both kinds. The
    /// highest-sequence collecting loader receives free-text input.
    pub seq: u64,
    /// When the loader was created.
    pub created_at: DateTime<Utc>,
    /// Collected credential tokens.
    pub credentials: Vec<Credential>,
    /// Target identifier messages are delivered to.
    pub target_id: Option<String>,
    /// Messages replayed by the scheduler.
    pub messages: Vec<String>,
    /// Seconds between deliveries.
    pub delay_secs: Option<u64>,
    /// Current position in the collection dialogue.
    pub awaiting: Awaiting,
    /// True while a scheduler task is running for this loader.
    pub active: bool,
    /// Cancels the scheduler task. Replaced on each start.
    pub cancel: CancellationToken,
    log: VecDeque<LogEntry>,
    max_log_entries: usize,
}

impl Loader {
    /// Create a new loader awaiting its first credential token.
    pub fn new(kind: LoaderKind, index: usize, seq: u64, max_log_entries: usize) -> Self {
        Self {
            kind,
            index,
            seq,
            created_at: Utc::now(),
            credentials: Vec::new(),
            target_id: None,
            messages: Vec::new(),
            delay_secs: None,
            awaiting: Awaiting::Tokens,
            active: false,
            cancel: CancellationToken::new(),
            log: VecDeque::new(),
            max_log_entries,
        }
    }

    /// True while this loader is still collecting configuration input.
    pub fn is_collecting(&self) -> bool {
        self.awaiting.is_collecting()
    }

    /// True once credentials, target, messages, and delay are all present.
    pub fn is_configured(&self) -> bool {
        !self.credentials.is_empty()
            && self.target_id.is_some()
            && !self.messages.is_empty()
            && self.delay_secs.is_some()
    }

    /// Append a log entry, dropping the oldest when the cap is reached.
    pub fn push_log(&mut self, entry: LogEntry) {
        if self.log.len() >= self.max_log_entries {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }

    /// Render log entries matching the query, oldest first.
    pub fn log_lines(&self, query: &LogQuery) -> Vec<String> {
        let cutoff = query.since.and_then(|since| {
            chrono::Duration::from_std(since)
                .ok()
                .map(|d| Utc::now() - d)
        });
        let mut entries: Vec<&LogEntry> = self
            .log
            .iter()
            .filter(|e| cutoff.is_none_or(|cutoff| e.timestamp >= cutoff))
            .collect();
        if let Some(limit) = query.limit {
            let skip = entries.len().saturating_sub(limit);
            entries.drain(..skip);
        }
        entries.iter().map(|e| e.to_string()).collect()
    }

    /// Retained log entries, oldest first.
    pub fn log_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    /// Number of retained log entries.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Mark this loader stopped: cancel the scheduler task and leave the
    /// collection dialogue for good. Idempotent.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.active = false;
        self.awaiting = Awaiting::Stopped;
    }

    /// Take an immutable delivery plan for the scheduler, or `None` if the
    /// configuration is incomplete.
    pub fn plan(&self) -> Option<LoaderPlan> {
        if !self.is_configured() {
            return None;
        }
        Some(LoaderPlan {
            kind: self.kind,
            index: self.index,
            credentials: self.credentials.clone(),
            target_id: self.target_id.clone()?,
            messages: self.messages.clone(),
            delay_secs: self.delay_secs?,
        })
    }
}

/// Immutable snapshot of a fully configured loader, taken once at start.
///
/// Edits made to the loader while the scheduler runs do not affect an
/// in-flight run; the task works from this plan alone.
#[derive(Debug, Clone)]
pub struct LoaderPlan {
    pub kind: LoaderKind,
    pub index: usize,
    pub credentials: Vec<Credential>,
    pub target_id: String,
    pub messages: Vec<String>,
    pub delay_secs: u64,
}
