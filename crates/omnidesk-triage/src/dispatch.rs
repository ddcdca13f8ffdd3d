// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact triage dispatch.
//!
//! One worker task and queue per contact: messages from a single contact are
//! processed strictly in arrival order, while different contacts proceed
//! concurrently. A slow assistant call for contact A never delays delivery
//! for contact B.
//!
//! Enqueueing is unbounded and non-blocking, so the router's single
//! dispatch loop is never held up by a busy contact.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error};

use omnidesk_channel::InboundHandler;
use omnidesk_core::{DeskError, InboundMessage};

use crate::pipeline::TriagePipeline;

/// Fans inbound messages out to per-contact worker queues.
pub struct TriageDispatcher {
    pipeline: Arc<TriagePipeline>,
    workers: DashMap<String, mpsc::UnboundedSender<InboundMessage>>,
}

impl TriageDispatcher {
    pub fn new(pipeline: Arc<TriagePipeline>) -> Self {
        Self {
            pipeline,
            workers: DashMap::new(),
        }
    }

    /// Number of contact workers spawned so far. Workers live for the rest
    /// of the process; the set is bounded by the active contact population.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn worker_for(&self, contact_id: &str) -> mpsc::UnboundedSender<InboundMessage> {
        self.workers
            .entry(contact_id.to_string())
            .or_insert_with(|| {
                debug!(contact_id, "spawning triage worker");
                let (tx, mut rx) = mpsc::unbounded_channel::<InboundMessage>();
                let pipeline = Arc::clone(&self.pipeline);
                let worker_contact = contact_id.to_string();
                tokio::spawn(async move {
                    while let Some(msg) = rx.recv().await {
                        if let Err(e) = pipeline.process(msg).await {
                            error!(
                                contact_id = %worker_contact,
                                error = %e,
                                "triage pipeline failed for message"
                            );
                        }
                    }
                });
                tx
            })
            .clone()
    }
}

#[async_trait]
impl InboundHandler for TriageDispatcher {
    async fn handle_message(&self, msg: InboundMessage) -> Result<(), DeskError> {
        let tx = self.worker_for(&msg.contact_id);
        tx.send(msg).map_err(|_| {
            DeskError::Internal("triage worker queue closed".into())
        })
    }
}
