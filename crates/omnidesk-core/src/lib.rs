// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the OmniDesk support desk.
//!
//! This crate provides the foundational trait definitions, error type, and
//! domain/wire types used throughout the OmniDesk workspace. All components
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DeskError;
pub use types::{
    AdapterType, ChannelCommand, ChannelEvent, ChannelStatus, ConnectionState, Contact,
    HealthStatus, InboundMedia, InboundMessage, MediaKind, NewMessage, NewTicket,
    PresenceState, StoredMessage, Ticket, TicketPatch, TicketStatus,
};

pub use traits::{
    Assistant, ChannelSession, ChannelTransport, MediaStore, PluginAdapter, StorageAdapter,
    TransportLink,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desk_error_has_all_variants() {
        let _config = DeskError::Config("test".into());
        let _storage = DeskError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = DeskError::Channel {
            message: "test".into(),
            source: None,
        };
        let _unavailable = DeskError::ChannelUnavailable;
        let _provider = DeskError::Provider {
            message: "test".into(),
            source: None,
        };
        let _media = DeskError::Media {
            message: "test".into(),
            source: None,
        };
        let _not_found = DeskError::NotFound {
            entity: "contact",
            id: "c-1".into(),
        };
        let _timeout = DeskError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = DeskError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Channel,
            AdapterType::Storage,
            AdapterType::Provider,
            AdapterType::MediaStore,
        ] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // If any trait module is missing or has a compile error, this test
        // won't compile.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_transport<T: ChannelTransport>() {}
        fn _assert_session<T: ChannelSession>() {}
        fn _assert_media_store<T: MediaStore>() {}
        fn _assert_assistant<T: Assistant>() {}
    }
}
