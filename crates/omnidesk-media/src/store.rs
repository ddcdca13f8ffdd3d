// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Disk-backed implementation of the [`MediaStore`] trait.
//!
//! Writes attachments into a flat uploads directory and hands back
//! `/uploads/{name}` references. The gateway serves the directory
//! statically, so references stay resolvable after a restart.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use omnidesk_core::{AdapterType, DeskError, HealthStatus, MediaStore, PluginAdapter};

/// URL prefix under which the gateway exposes stored files.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Disk-backed media store rooted at a configured uploads directory.
pub struct DiskMediaStore {
    root: PathBuf,
}

impl DiskMediaStore {
    /// Creates the store, making the uploads directory if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, DeskError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| DeskError::Media {
            message: format!("failed to create uploads dir {}: {e}", root.display()),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { root })
    }

    /// The directory files are written into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Strips any path components from a suggested name so a crafted name
    /// cannot escape the uploads directory.
    fn sanitize(name: &str) -> String {
        Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file.bin".to_string())
    }
}

#[async_trait]
impl PluginAdapter for DiskMediaStore {
    fn name(&self) -> &str {
        "disk-media"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::MediaStore
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskError> {
        if self.root.is_dir() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!(
                "uploads dir missing: {}",
                self.root.display()
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), DeskError> {
        Ok(())
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String, DeskError> {
        let name = Self::sanitize(suggested_name);
        let path = self.root.join(&name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DeskError::Media {
                message: format!("failed to write {}: {e}", path.display()),
                source: Some(Box::new(e)),
            })?;

        debug!(file = %name, size = bytes.len(), "media saved");
        Ok(format!("{UPLOADS_PREFIX}{name}"))
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.strip_prefix(UPLOADS_PREFIX)?;
        let name = Self::sanitize(name);
        let path = self.root.join(name);
        path.exists().then_some(path)
    }
}
