// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for values figment cannot check.

use crate::model::DeskConfig;

/// A human-readable configuration problem, keyed by the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate cross-field and format constraints. Returns every problem found,
/// not just the first.
pub fn validate_config(config: &DeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.desk.log_level.as_str()) {
        errors.push(ConfigError {
            field: "desk.log_level".into(),
            message: format!(
                "must be one of {LOG_LEVELS:?}, got {:?}",
                config.desk.log_level
            ),
        });
    }

    if !config.channel.bridge_url.starts_with("ws://")
        && !config.channel.bridge_url.starts_with("wss://")
    {
        errors.push(ConfigError {
            field: "channel.bridge_url".into(),
            message: format!(
                "must be a ws:// or wss:// URL, got {:?}",
                config.channel.bridge_url
            ),
        });
    }

    if config.channel.send_timeout_secs == 0 {
        errors.push(ConfigError {
            field: "channel.send_timeout_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.channel.backoff_base_ms > config.channel.backoff_cap_ms {
        errors.push(ConfigError {
            field: "channel.backoff_base_ms".into(),
            message: "base delay exceeds backoff_cap_ms".into(),
        });
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError {
            field: "anthropic.max_tokens".into(),
            message: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
