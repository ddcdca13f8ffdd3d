// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing control surface for the OmniDesk support desk.
//!
//! REST endpoints for channel lifecycle, the ticket board, contacts and
//! conversation history, plus a WebSocket subscription to the live
//! notification bus and static serving of stored media.

pub mod error;
pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{build_router, start_server, GatewayState, ServerConfig};
