// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait implemented by every pluggable component.

use async_trait::async_trait;

use crate::error::DeskError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all OmniDesk components.
///
/// Every component (channel transport, storage, provider, media store)
/// implements this trait, which provides identity, lifecycle, and health
/// check capabilities.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this component instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this component.
    fn version(&self) -> semver::Version;

    /// Returns the type of component (channel, storage, etc.).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the component's current status.
    async fn health_check(&self) -> Result<HealthStatus, DeskError>;

    /// Gracefully shuts down the component, releasing any held resources.
    async fn shutdown(&self) -> Result<(), DeskError>;
}
