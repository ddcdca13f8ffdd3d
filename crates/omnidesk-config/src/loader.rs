// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./omnidesk.toml` > `~/.config/omnidesk/omnidesk.toml`
//! > `/etc/omnidesk/omnidesk.toml` with environment variable overrides via
//! `OMNIDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/omnidesk/omnidesk.toml` (system-wide)
/// 3. `~/.config/omnidesk/omnidesk.toml` (user XDG config)
/// 4. `./omnidesk.toml` (local directory)
/// 5. `OMNIDESK_*` environment variables
pub fn load_config() -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file("/etc/omnidesk/omnidesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("omnidesk/omnidesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("omnidesk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `OMNIDESK_ANTHROPIC_API_KEY` must map to
/// `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("OMNIDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("desk_", "desk.", 1)
            .replacen("channel_", "channel.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("media_", "media.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_with_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.desk.name, "omnidesk");
        assert_eq!(config.gateway.port, 3001);
    }

    #[test]
    fn load_from_str_overrides_section() {
        let toml = r#"
            [channel]
            bridge_url = "ws://10.0.0.5:9000"
            send_timeout_secs = 10

            [gateway]
            port = 8080
        "#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.channel.bridge_url, "ws://10.0.0.5:9000");
        assert_eq!(config.channel.send_timeout_secs, 10);
        assert_eq!(config.gateway.port, 8080);
        // Untouched sections keep defaults.
        assert_eq!(config.anthropic.api_version, "2023-06-01");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml = r#"
            [channel]
            bridge_uri = "ws://oops"
        "#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let toml = r#"
            [telemetry]
            enabled = true
        "#;
        assert!(load_config_from_str(toml).is_err());
    }
}
