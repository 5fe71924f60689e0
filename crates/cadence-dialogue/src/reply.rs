// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic reply templates.
//!
//! Every dialogue transition and router outcome maps to exactly one
//! template here, so tests can assert on stable fragments and the rest of
//! the crate never builds user-facing strings inline.

use cadence_core::types::LoaderKind;

/// Reply wording, seeded from config.
#[derive(Debug, Clone)]
pub struct ReplyCatalog {
    /// Name reported by ownership and attribution commands.
    pub owner: String,
    /// Response to the greeting command.
    pub greeting: String,
    /// Canned trigger phrases and their replies, triggers normalized to
    /// trimmed lowercase.
    canned: Vec<(String, String)>,
}

impl ReplyCatalog {
    pub fn new(owner: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            greeting: greeting.into(),
            canned: default_canned(),
        }
    }

    /// Replace the canned phrase list. Triggers match on the same trimmed
    /// lowercase form the command router uses.
    pub fn with_canned<I, S>(mut self, canned: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.canned = canned
            .into_iter()
            .map(|(trigger, reply)| (trigger.into().trim().to_lowercase(), reply.into()))
            .collect();
        self
    }

    /// The canned reply for a normalized message, if one is configured.
    pub fn canned_reply(&self, normalized: &str) -> Option<String> {
        self.canned
            .iter()
            .find(|(trigger, _)| trigger == normalized)
            .map(|(_, reply)| reply.clone())
    }

    pub fn activation_prompt(&self, kind: LoaderKind, index: usize) -> String {
        format!(
            "{kind} loader {index} activated. send credential tokens (comma or newline separated), then 'done'."
        )
    }

    pub fn tokens_added(&self, added: usize, total: usize) -> String {
        format!("added {added} token(s), {total} total. more tokens or 'done'.")
    }

    pub fn need_tokens(&self) -> String {
        "at least one token is required before 'done'.".to_string()
    }

    pub fn prompt_target(&self) -> String {
        "tokens saved. send the target id.".to_string()
    }

    pub fn target_set(&self, target: &str) -> String {
        format!("target '{target}' saved. send messages (comma or newline separated), then 'done'.")
    }

    pub fn need_target(&self) -> String {
        "target id cannot be empty. send the target id.".to_string()
    }

    pub fn messages_added(&self, added: usize, total: usize) -> String {
        format!("added {added} message(s), {total} total. more messages or 'done'.")
    }

    pub fn need_messages(&self) -> String {
        "at least one message is required before 'done'.".to_string()
    }

    pub fn prompt_delay(&self) -> String {
        "messages saved. send the delay in seconds.".to_string()
    }

    pub fn bad_delay(&self, input: &str) -> String {
        format!("'{input}' is not a valid delay. send a positive whole number of seconds.")
    }

    pub fn ready(&self, delay_secs: u64) -> String {
        format!("delay of {delay_secs}s saved. configuration complete, send 'start' to launch.")
    }

    pub fn not_started(&self) -> String {
        "configuration incomplete until launched. send 'start' to launch.".to_string()
    }

    pub fn started(&self, kind: LoaderKind, index: usize) -> String {
        format!("{kind} loader {index} is running.")
    }

    pub fn stopped(&self, kind: LoaderKind, index: usize) -> String {
        format!("{kind} loader {index} stopped.")
    }

    pub fn status(&self, kind: LoaderKind, index: usize, active: bool) -> String {
        let state = if active { "active" } else { "stopped" };
        format!("{kind} loader {index} is {state}.")
    }

    pub fn no_loader(&self, kind: LoaderKind) -> String {
        format!("no {kind} loader exists. send '{kind} loader' to create one.")
    }

    pub fn no_loader_at(&self, kind: LoaderKind, index: usize) -> String {
        format!("no {kind} loader {index} exists.")
    }

    pub fn empty_log(&self) -> String {
        "no log entries yet.".to_string()
    }

    pub fn cleared(&self) -> String {
        "chat history cleared.".to_string()
    }

    pub fn owner_name(&self) -> String {
        self.owner.clone()
    }

    pub fn greeting(&self) -> String {
        self.greeting.clone()
    }

    pub fn attribution(&self) -> String {
        format!("I was created by {}, the owner of this bot.", self.owner)
    }

    pub fn time(&self, rendered: &str) -> String {
        format!("current time: {rendered}")
    }

    pub fn unrecognized(&self) -> String {
        "unrecognized command.".to_string()
    }
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        Self::new("Jerry", "hey")
    }
}

fn default_canned() -> Vec<(String, String)> {
    vec![(
        "hlo aap kaise ho".to_string(),
        "I am just a bot, but I am here to help! How can I assist you today?".to_string(),
    )]
}
