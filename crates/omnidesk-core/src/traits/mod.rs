// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component trait definitions for the OmniDesk architecture.
//!
//! All component traits extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod assistant;
pub mod channel;
pub mod media;
pub mod storage;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use assistant::Assistant;
pub use channel::{ChannelSession, ChannelTransport, TransportLink};
pub use media::MediaStore;
pub use storage::StorageAdapter;
