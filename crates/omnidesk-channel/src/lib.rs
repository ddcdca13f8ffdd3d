// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel session lifecycle and inbound event routing for OmniDesk.
//!
//! [`SessionManager`] owns the single connection to the external chat
//! network (via a websocket bridge), [`EventRouter`] fans its decoded event
//! stream out to the triage pipeline and the notification bus.

pub mod backoff;
pub mod manager;
pub mod router;
pub mod transport;

pub use manager::SessionManager;
pub use router::{EventRouter, InboundHandler};
pub use transport::BridgeTransport;
