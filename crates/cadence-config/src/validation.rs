// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a parseable timezone, a `{target}` placeholder in the
//! sink endpoint, and positive capacity bounds.

use std::str::FromStr;

use crate::diagnostic::ConfigError;
use crate::model::CadenceConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CadenceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let addr = config.gateway.host.trim();
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "gateway.host `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if chrono_tz::Tz::from_str(&config.agent.timezone).is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.timezone `{}` is not a known IANA timezone",
                config.agent.timezone
            ),
        });
    }

    if config.identity.store_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "identity.store_path must not be empty".to_string(),
        });
    }

    if !config.sink.endpoint.contains("{target}") {
        errors.push(ConfigError::Validation {
            message: format!(
                "sink.endpoint `{}` must contain a `{{target}}` placeholder",
                config.sink.endpoint
            ),
        });
    }

    if config.scheduler.send_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.send_timeout_secs must be positive".to_string(),
        });
    }

    for (name, value) in [
        ("session.max_loaders_per_kind", config.session.max_loaders_per_kind),
        ("session.max_log_entries", config.session.max_log_entries),
        (
            "session.max_transcript_entries",
            config.session.max_transcript_entries,
        ),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be positive"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
