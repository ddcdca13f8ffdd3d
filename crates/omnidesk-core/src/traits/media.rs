// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media store trait for binary attachment persistence.

use async_trait::async_trait;

use crate::error::DeskError;

/// Persists binary attachments to addressable locations.
///
/// The returned reference must stay independently resolvable later (the
/// gateway serves the disk-backed store as static files).
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// Writes the bytes under the suggested name and returns the public
    /// reference (e.g. `/uploads/{name}`).
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String, DeskError>;

    /// Resolves a previously returned reference to a local filesystem path.
    fn resolve(&self, reference: &str) -> Option<std::path::PathBuf>;
}
