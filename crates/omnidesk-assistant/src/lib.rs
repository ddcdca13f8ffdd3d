// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant engine for the OmniDesk support desk.
//!
//! Turns (message text + optional media + conversation memory) into a
//! natural-language triage reply, optionally embedding a structured handoff
//! report between sentinel markers.

pub mod client;
pub mod engine;
pub mod memory;
pub mod report;
pub mod types;

pub use client::AnthropicClient;
pub use engine::{AssistantEngine, APOLOGY};
pub use memory::ConversationMemory;
pub use report::{HandoffReport, REPORT_END, REPORT_START};
