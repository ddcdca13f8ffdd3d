// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `omnidesk-core::types` for use across
//! component trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use omnidesk_core::types::{
    Contact, MediaKind, NewMessage, NewTicket, StoredMessage, Ticket, TicketPatch, TicketStatus,
};
