// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the operator REST API.

pub mod channel;
pub mod contacts;
pub mod tickets;
pub mod uploads;
