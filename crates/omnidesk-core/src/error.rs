// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the OmniDesk support desk.

use thiserror::Error;

/// The primary error type used across all OmniDesk components.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel errors (connection failure, wire decode, send rejection).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No live connection to the chat network; the send can be retried once
    /// the channel reports connected again.
    #[error("channel unavailable: not connected")]
    ChannelUnavailable,

    /// Assistant provider errors (API failure, token limits, bad response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Media store errors (download, disk write, invalid reference).
    #[error("media error: {message}")]
    Media {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation timed out. Retryable.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// True when the failure is transient and the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeskError::ChannelUnavailable | DeskError::Timeout { .. })
    }
}
