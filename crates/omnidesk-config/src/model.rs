// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the OmniDesk support desk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level OmniDesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskConfig {
    /// Desk identity and logging settings.
    #[serde(default)]
    pub desk: DeskSection,

    /// Chat channel bridge settings.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Anthropic API settings for the assistant engine.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Media store settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Operator gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Desk identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskSection {
    /// Display name of the desk instance.
    #[serde(default = "default_desk_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DeskSection {
    fn default() -> Self {
        Self {
            name: default_desk_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_desk_name() -> String {
    "omnidesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat channel bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Websocket URL of the channel bridge process.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    /// Directory holding the persisted session credential blob. Removed as
    /// a unit on reset.
    #[serde(default = "default_session_dir")]
    pub session_dir: String,

    /// Bounded timeout applied to individual sends, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Base reconnect backoff delay in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Reconnect backoff ceiling in milliseconds.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,

    /// Quiescent delay before session storage is deleted during a reset, in
    /// milliseconds. Lets an in-flight handshake release its file handles.
    #[serde(default = "default_reset_grace_ms")]
    pub reset_grace_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            session_dir: default_session_dir(),
            send_timeout_secs: default_send_timeout_secs(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            reset_grace_ms: default_reset_grace_ms(),
        }
    }
}

fn default_bridge_url() -> String {
    "ws://127.0.0.1:8055".to_string()
}

fn default_session_dir() -> String {
    "./session".to_string()
}

fn default_send_timeout_secs() -> u64 {
    30
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_cap_ms() -> u64 {
    60_000
}

fn default_reset_grace_ms() -> u64 {
    2_000
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model to use for triage replies.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("omnidesk").join("omnidesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("omnidesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Media store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Directory where attachments are written. Served statically by the
    /// gateway under `/uploads`.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Maximum accepted operator upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_uploads_dir() -> String {
    "./uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

/// Operator gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = DeskConfig::default();
        assert_eq!(config.desk.name, "omnidesk");
        assert_eq!(config.desk.log_level, "info");
        assert_eq!(config.channel.bridge_url, "ws://127.0.0.1:8055");
        assert_eq!(config.channel.send_timeout_secs, 30);
        assert_eq!(config.anthropic.max_tokens, 2048);
        assert_eq!(config.gateway.port, 3001);
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn backoff_defaults_are_capped() {
        let config = ChannelConfig::default();
        assert!(config.backoff_base_ms < config.backoff_cap_ms);
        assert_eq!(config.backoff_cap_ms, 60_000);
    }
}
