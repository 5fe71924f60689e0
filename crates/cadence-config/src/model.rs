// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cadence loader bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use cadence_core::types::{ExhaustionPolicy, FailurePolicy, IterationStrategy};
use serde::{Deserialize, Serialize};

/// Top-level Cadence configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CadenceConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Canned reply wording.
    #[serde(default)]
    pub replies: RepliesConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Identity resolution settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Per-user session state bounds.
    #[serde(default)]
    pub session: SessionConfig,

    /// Loader scheduler policies.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Message sink (external posting API) settings.
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Name reported by the `owner name` and attribution commands.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// IANA timezone used by the `time` command (e.g. "Asia/Kolkata").
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            owner: default_owner(),
            timezone: default_timezone(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "cadence".to_string()
}

fn default_owner() -> String {
    "Jerry".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Canned reply wording for the command router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepliesConfig {
    /// Reply to the greeting command.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Extra canned trigger phrases and their replies, checked before the
    /// command table. Setting `[replies.canned]` replaces the defaults.
    #[serde(default = "default_canned")]
    pub canned: BTreeMap<String, String>,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            canned: default_canned(),
        }
    }
}

fn default_greeting() -> String {
    "hey".to_string()
}

fn default_canned() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "hlo aap kaise ho".to_string(),
        "I am just a bot, but I am here to help! How can I assist you today?".to_string(),
    )])
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Identity resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// When true, requests without an identifier or known session token are
    /// rejected instead of receiving a synthesized pseudo-identity.
    #[serde(default)]
    pub require_identifier: bool,

    /// Path of the flat JSON identity store, reloaded at startup and
    /// rewritten after every new registration.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            require_identifier: false,
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    "cadence-identities.json".to_string()
}

/// Bounds on per-user in-memory session state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Maximum loaders per user per kind.
    #[serde(default = "default_max_loaders")]
    pub max_loaders_per_kind: usize,

    /// Maximum retained log entries per loader (oldest dropped first).
    #[serde(default = "default_max_entries")]
    pub max_log_entries: usize,

    /// Maximum retained chat transcript lines per user.
    #[serde(default = "default_max_entries")]
    pub max_transcript_entries: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_loaders_per_kind: default_max_loaders(),
            max_log_entries: default_max_entries(),
            max_transcript_entries: default_max_entries(),
        }
    }
}

fn default_max_loaders() -> usize {
    16
}

fn default_max_entries() -> usize {
    500
}

/// Loader scheduler policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// How credential and message lists are iterated: "lockstep" or "nested".
    #[serde(default)]
    pub strategy: IterationStrategy,

    /// What a delivery failure does: "continue" or "abort".
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// What happens after one full pass: "repeat" or "stop".
    #[serde(default)]
    pub exhaustion: ExhaustionPolicy,

    /// Timeout applied to each individual sink delivery, in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            strategy: IterationStrategy::default(),
            on_failure: FailurePolicy::default(),
            exhaustion: ExhaustionPolicy::default(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_send_timeout() -> u64 {
    30
}

/// Message sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    /// Delivery endpoint URL template. `{target}` is replaced with the
    /// loader's target identifier.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// When true, credential tokens are resolved to display names for log
    /// labeling via `name_endpoint`.
    #[serde(default)]
    pub resolve_names: bool,

    /// Endpoint queried for credential display names.
    #[serde(default = "default_name_endpoint")]
    pub name_endpoint: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            resolve_names: false,
            name_endpoint: default_name_endpoint(),
        }
    }
}

fn default_endpoint() -> String {
    "https://graph.facebook.com/v19.0/t_{target}".to_string()
}

fn default_name_endpoint() -> String {
    "https://graph.facebook.com/v19.0/me".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = CadenceConfig::default();
        assert_eq!(config.agent.name, "cadence");
        assert_eq!(config.agent.timezone, "UTC");
        assert_eq!(config.gateway.port, 3000);
        assert!(!config.identity.require_identifier);
        assert_eq!(config.scheduler.send_timeout_secs, 30);
        assert!(config.sink.endpoint.contains("{target}"));
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let toml_str = r#"
[agent]
name = "test"

[nonsense]
value = 1
"#;
        assert!(toml::from_str::<CadenceConfig>(toml_str).is_err());
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml_str = r#"
[scheduler]
strateggy = "nested"
"#;
        assert!(toml::from_str::<CadenceConfig>(toml_str).is_err());
    }

    #[test]
    fn scheduler_policies_deserialize_from_strings() {
        let toml_str = r#"
[scheduler]
strategy = "nested"
on_failure = "abort"
exhaustion = "stop"
"#;
        let config: CadenceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.scheduler.strategy,
            cadence_core::IterationStrategy::Nested
        );
        assert_eq!(
            config.scheduler.on_failure,
            cadence_core::FailurePolicy::Abort
        );
        assert_eq!(
            config.scheduler.exhaustion,
            cadence_core::ExhaustionPolicy::Stop
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml_str = r#"
[gateway]
port = 8080
"#;
        let config: CadenceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.agent.owner, "Jerry");
    }
}
