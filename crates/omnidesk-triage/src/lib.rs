// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message triage for the OmniDesk support desk.
//!
//! The [`TriagePipeline`] turns one inbound message into persisted
//! conversation state, an optional ticket, and an optional automated reply;
//! the [`TriageDispatcher`] runs it on per-contact workers so conversations
//! stay ordered without blocking each other.

pub mod dispatch;
pub mod pipeline;

#[cfg(test)]
mod testutil;

pub use dispatch::TriageDispatcher;
pub use pipeline::TriagePipeline;
