// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant seam consumed by the triage pipeline.

use std::path::Path;

use async_trait::async_trait;

/// Generates conversational replies from message text, per-conversation
/// memory, and optional media.
///
/// `generate` is infallible by contract: any provider failure is absorbed
/// and a fixed user-facing apology is returned, so an automated conversation
/// never stalls on an error.
#[async_trait]
pub trait Assistant: Send + Sync + 'static {
    /// Returns the raw reply, including any embedded handoff report block.
    /// Stripping the block before delivery is the caller's job.
    async fn generate(
        &self,
        text: &str,
        conversation_id: &str,
        media_path: Option<&Path>,
    ) -> String;
}
