// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media store for the OmniDesk support desk.
//!
//! Persists binary attachments (downloaded channel media and operator
//! uploads) to an addressable uploads directory.

pub mod filename;
pub mod store;

pub use filename::{derive_filename, extension_for_mime};
pub use store::{DiskMediaStore, UPLOADS_PREFIX};
