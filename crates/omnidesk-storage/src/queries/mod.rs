// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod contacts;
pub mod messages;
pub mod tickets;
