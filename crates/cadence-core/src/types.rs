// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Cadence workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable opaque key identifying one user across requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserKey(pub String);

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque session token handed to clients that did not supply an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

/// The kind of loader a user can configure. Each kind has its own
/// independent sequence of loaders per user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Post,
    Convo,
}

impl LoaderKind {
    /// All loader kinds, in router priority order.
    pub const ALL: [LoaderKind; 2] = [LoaderKind::Post, LoaderKind::Convo];
}

/// The field a loader's dialogue is currently collecting, or its run state.
///
/// Determines exactly which fields conversation input may still mutate:
/// anything already confirmed is immutable through the dialogue path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Awaiting {
    /// Collecting credential tokens.
    Tokens,
    /// Collecting the target identifier.
    Target,
    /// Collecting message bodies.
    Messages,
    /// Collecting the delay interval.
    Delay,
    /// Fully configured, waiting for the start trigger.
    Ready,
    /// Background task running.
    Running,
    /// Stopped (explicitly or by exhaustion).
    Stopped,
}

impl Awaiting {
    /// True while the dialogue interpreter owns input for this loader.
    pub fn is_collecting(self) -> bool {
        matches!(
            self,
            Awaiting::Tokens
                | Awaiting::Target
                | Awaiting::Messages
                | Awaiting::Delay
                | Awaiting::Ready
        )
    }
}

/// One credential token, optionally annotated with a resolved display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub display_name: Option<String>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            display_name: None,
        }
    }

    /// The label used in log entries: the resolved name when known,
    /// otherwise a truncated token fingerprint.
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => {
                let head: String = self.token.chars().take(8).collect();
                format!("token:{head}…")
            }
        }
    }
}

/// Outcome of one scheduler attempt or lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogOutcome {
    /// Delivery succeeded.
    Sent,
    /// Delivery failed (sink error or timeout).
    Failed,
    /// Finite message list exhausted; loader auto-stopped.
    Completed,
    /// Loader stopped cooperatively.
    Stopped,
}

/// One immutable, timestamped entry in a loader's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub outcome: LogOutcome,
    pub detail: String,
}

impl LogEntry {
    pub fn now(outcome: LogOutcome, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            outcome,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.outcome,
            self.detail
        )
    }
}

/// Recency filter for log queries. Both filters may combine: `since`
/// restricts to a trailing window, `limit` keeps the most recent N.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogQuery {
    pub limit: Option<usize>,
    pub since: Option<std::time::Duration>,
}

impl LogQuery {
    /// Query returning the full log.
    pub fn full() -> Self {
        Self::default()
    }

    /// Query returning the most recent `n` entries.
    pub fn last(n: usize) -> Self {
        Self {
            limit: Some(n),
            since: None,
        }
    }
}

/// Receipt returned by a message sink for a successful delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkReceipt {
    /// Delivery id assigned by the remote API, when it reports one.
    pub id: Option<String>,
}

/// How the scheduler walks the credential and message lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IterationStrategy {
    /// Token and message indices advance together, modulo their lengths;
    /// one send per cycle.
    #[default]
    Lockstep,
    /// Every credential sends every message each cycle.
    Nested,
}

/// What the scheduler does when a delivery fails.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and keep cycling.
    #[default]
    Continue,
    /// Log the failure, clear the active flag, and exit the task.
    Abort,
}

/// What the scheduler does after one full pass over the message list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Cycle over the message list forever until stopped.
    #[default]
    Repeat,
    /// Stop after one full pass, logging a completion entry.
    Stop,
}
