// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the OmniDesk support desk.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::DeskConfig;
pub use validation::ConfigError;

/// Load configuration from the XDG hierarchy and validate it.
///
/// The high-level entry point used by the binary: loads config from TOML
/// files + env vars via figment, then runs post-deserialization validation.
pub fn load_and_validate() -> Result<DeskConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError {
            field: "<config>".into(),
            message: err.to_string(),
        }]),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<DeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError {
            field: "<inline>".into(),
            message: err.to_string(),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_accepts_defaults() {
        let config = load_and_validate_str("").unwrap();
        assert_eq!(config.desk.name, "omnidesk");
    }

    #[test]
    fn load_and_validate_str_reports_validation_errors() {
        let errors = load_and_validate_str("[anthropic]\nmax_tokens = 0").unwrap_err();
        assert!(errors.iter().any(|e| e.field == "anthropic.max_tokens"));
    }
}
