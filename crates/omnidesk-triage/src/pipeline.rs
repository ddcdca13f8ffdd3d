// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message triage pipeline.
//!
//! For each inbound conversational message: resolve the contact, fetch and
//! store any media, persist the message, and -- only when the contact's
//! automation gate is open -- generate an assistant reply, file a ticket
//! from the embedded handoff report, and deliver the cleaned reply.
//!
//! Failures stay local to the message being processed: a failed media
//! download degrades to a placeholder, a malformed report is logged and
//! dropped, and a failed send leaves the attempted reply unrecorded.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use omnidesk_assistant::report;
use omnidesk_bus::{BusEvent, EventBus};
use omnidesk_core::{
    Assistant, ChannelSession, DeskError, InboundMedia, InboundMessage, MediaKind, MediaStore,
    NewMessage, NewTicket, PresenceState, StorageAdapter, TicketStatus,
};

/// Message content when a media payload could not be downloaded.
const DOWNLOAD_FAILURE_PLACEHOLDER: &str = "[Erro ao baixar arquivo]";

/// Processes inbound messages into persisted conversation + ticket state.
pub struct TriagePipeline {
    storage: Arc<dyn StorageAdapter>,
    assistant: Arc<dyn Assistant>,
    media_store: Arc<dyn MediaStore>,
    channel: Arc<dyn ChannelSession>,
    bus: EventBus,
    http: reqwest::Client,
}

impl TriagePipeline {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        assistant: Arc<dyn Assistant>,
        media_store: Arc<dyn MediaStore>,
        channel: Arc<dyn ChannelSession>,
        bus: EventBus,
    ) -> Self {
        Self {
            storage,
            assistant,
            media_store,
            channel,
            bus,
            http: reqwest::Client::new(),
        }
    }

    /// Runs the full triage algorithm for one inbound message.
    pub async fn process(&self, msg: InboundMessage) -> Result<(), DeskError> {
        // Contact names default like the source desk: unseen numbers become
        // "Cliente Novo" until an operator renames them.
        let display_name = msg.push_name.as_deref().unwrap_or("Cliente Novo");
        let contact = self
            .storage
            .upsert_contact(&msg.contact_id, display_name)
            .await?;

        let mut content = msg.text.clone().unwrap_or_default();
        let mut media_kind = MediaKind::Text;
        let mut media_url = None;
        let mut local_path: Option<PathBuf> = None;

        if let Some(media) = &msg.media {
            media_kind = media.kind;
            match self.fetch_media(media, &msg.contact_id).await {
                Ok((url, path)) => {
                    if content.is_empty() {
                        content = format!("[Arquivo: {}]", media.kind);
                    }
                    media_url = Some(url);
                    local_path = Some(path);
                }
                Err(e) => {
                    // Non-fatal: record the failure and keep triaging.
                    warn!(contact_id = %msg.contact_id, error = %e, "media download failed");
                    content = DOWNLOAD_FAILURE_PLACEHOLDER.to_string();
                }
            }
        }

        let stored = self
            .storage
            .insert_message(NewMessage {
                contact_id: contact.id.clone(),
                content: content.clone(),
                from_me: false,
                from_assistant: false,
                media_kind,
                media_url,
            })
            .await?;
        self.bus.publish(BusEvent::MessageNew {
            contact_id: contact.id.clone(),
            message: stored,
        });

        // Automation gate: the flag is re-read on every message via the
        // upsert above, never cached across turns.
        if !contact.ai_enabled {
            debug!(contact_id = %contact.id, "automation disabled, leaving to human agent");
            return Ok(());
        }

        if let Err(e) = self
            .channel
            .send_presence(&contact.id, PresenceState::Composing)
            .await
        {
            debug!(error = %e, "composing presence not delivered");
        }

        let raw = self
            .assistant
            .generate(&content, &contact.id, local_path.as_deref())
            .await;

        match report::parse_report(&raw) {
            Some(Ok(parsed)) => {
                let ticket = self
                    .storage
                    .create_ticket(NewTicket {
                        contact_id: contact.id.clone(),
                        title: parsed.title(),
                        priority: parsed.priority(),
                        status: TicketStatus::Queued,
                        summary: Some(parsed.fields),
                    })
                    .await?;
                info!(ticket_id = %ticket.id, contact_id = %contact.id, "ticket filed from handoff report");
                self.bus.publish(BusEvent::TicketUpdate { ticket });
            }
            Some(Err(e)) => {
                warn!(contact_id = %contact.id, error = %e, "malformed handoff report, skipping ticket");
            }
            None => {}
        }

        // The sentinel block never reaches the contact, parsed or not.
        let final_text = report::strip_block(&raw);
        if final_text.is_empty() {
            return Ok(());
        }

        // Deliver first; only a sent reply is recorded.
        self.channel.send_text(&contact.id, &final_text).await?;

        let reply = self
            .storage
            .insert_message(NewMessage {
                contact_id: contact.id.clone(),
                content: final_text,
                from_me: true,
                from_assistant: true,
                media_kind: MediaKind::Text,
                media_url: None,
            })
            .await?;
        self.bus.publish(BusEvent::MessageNew {
            contact_id: contact.id,
            message: reply,
        });

        Ok(())
    }

    /// Downloads a media payload from the bridge and persists it through the
    /// media store. Returns the public reference and the local path handed
    /// to the assistant.
    async fn fetch_media(
        &self,
        media: &InboundMedia,
        contact_id: &str,
    ) -> Result<(String, PathBuf), DeskError> {
        let response = self
            .http
            .get(&media.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DeskError::Media {
                message: format!("download from {} failed: {e}", media.url),
                source: Some(Box::new(e)),
            })?;
        let bytes = response.bytes().await.map_err(|e| DeskError::Media {
            message: format!("download body from {} failed: {e}", media.url),
            source: Some(Box::new(e)),
        })?;

        let name = omnidesk_media::derive_filename(contact_id, &media.mime_type);
        let url = self.media_store.save(&bytes, &name).await?;
        let path = self.media_store.resolve(&url).ok_or_else(|| DeskError::Media {
            message: format!("saved media reference {url} did not resolve"),
            source: None,
        })?;

        debug!(file = %name, size = bytes.len(), "media stored");
        Ok((url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeAssistant, FakeChannel, FakeStorage};
    use omnidesk_media::DiskMediaStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Harness {
        storage: Arc<FakeStorage>,
        assistant: Arc<FakeAssistant>,
        channel: Arc<FakeChannel>,
        bus: EventBus,
        pipeline: TriagePipeline,
        _dir: tempfile::TempDir,
    }

    fn harness(reply: &str) -> Harness {
        let storage = Arc::new(FakeStorage::new());
        let assistant = Arc::new(FakeAssistant::new(reply));
        let channel = Arc::new(FakeChannel::new());
        let bus = EventBus::new();
        let dir = tempfile::tempdir().unwrap();
        let media_store =
            Arc::new(DiskMediaStore::new(dir.path().join("uploads")).unwrap());
        let pipeline = TriagePipeline::new(
            storage.clone(),
            assistant.clone(),
            media_store,
            channel.clone(),
            bus.clone(),
        );
        Harness {
            storage,
            assistant,
            channel,
            bus,
            pipeline,
            _dir: dir,
        }
    }

    fn text_message(id: &str, text: &str) -> InboundMessage {
        InboundMessage {
            id: id.into(),
            contact_id: "5511999990000@s.whatsapp.net".into(),
            push_name: Some("Maria".into()),
            from_me: false,
            text: Some(text.into()),
            media: None,
        }
    }

    #[tokio::test]
    async fn report_round_trip_files_ticket_and_sends_clean_reply() {
        let h = harness(r#"[REPORT_START]{"tema":"X","prioridade":"high"}[REPORT_END] Hello"#);
        let mut bus_rx = h.bus.subscribe();

        h.pipeline.process(text_message("m1", "oi")).await.unwrap();

        let tickets = h.storage.tickets();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].title, "X");
        assert_eq!(tickets[0].priority, "high");
        assert_eq!(tickets[0].status, TicketStatus::Queued);
        assert_eq!(tickets[0].summary.as_ref().unwrap()["tema"], "X");

        assert_eq!(h.channel.sent_texts(), vec!["Hello".to_string()]);

        let messages = h.storage.messages();
        assert_eq!(messages.len(), 2);
        assert!(!messages[0].from_me);
        assert!(messages[1].from_me);
        assert!(messages[1].from_assistant);
        assert_eq!(messages[1].content, "Hello");

        let mut names = Vec::new();
        while let Ok(event) = bus_rx.try_recv() {
            names.push(event.name());
        }
        assert_eq!(names, vec!["message:new", "ticket:update", "message:new"]);
    }

    #[tokio::test]
    async fn malformed_report_yields_no_ticket_but_clean_reply() {
        let h = harness("[REPORT_START]not-json[REPORT_END] Hi");
        h.pipeline.process(text_message("m1", "oi")).await.unwrap();

        assert!(h.storage.tickets().is_empty());
        assert_eq!(h.channel.sent_texts(), vec!["Hi".to_string()]);
        // The malformed block never reached the contact.
        assert!(!h.channel.sent_texts()[0].contains("REPORT"));
    }

    #[tokio::test]
    async fn reply_without_report_is_just_delivered() {
        let h = harness("Pode me contar mais?");
        h.pipeline.process(text_message("m1", "oi")).await.unwrap();
        assert!(h.storage.tickets().is_empty());
        assert_eq!(h.channel.sent_texts(), vec!["Pode me contar mais?".to_string()]);
    }

    #[tokio::test]
    async fn automation_disabled_skips_assistant_entirely() {
        let h = harness("nunca enviado");
        h.storage.set_ai_enabled(false);

        h.pipeline.process(text_message("m1", "oi")).await.unwrap();

        assert_eq!(h.assistant.call_count(), 0);
        assert!(h.channel.sent_texts().is_empty());
        // The inbound message was still persisted.
        assert_eq!(h.storage.messages().len(), 1);
    }

    #[tokio::test]
    async fn automation_flag_is_read_fresh_per_message() {
        let h = harness("resposta");
        h.pipeline.process(text_message("m1", "oi")).await.unwrap();
        assert_eq!(h.assistant.call_count(), 1);

        h.storage.set_ai_enabled(false);
        h.pipeline.process(text_message("m2", "ainda aí?")).await.unwrap();
        assert_eq!(h.assistant.call_count(), 1);
    }

    #[tokio::test]
    async fn report_only_reply_sends_nothing() {
        let h = harness(r#"[REPORT_START]{"tema":"X"}[REPORT_END]"#);
        h.pipeline.process(text_message("m1", "oi")).await.unwrap();

        assert_eq!(h.storage.tickets().len(), 1);
        assert!(h.channel.sent_texts().is_empty());
        // Only the inbound message exists; no automated reply row.
        assert_eq!(h.storage.messages().len(), 1);
    }

    #[tokio::test]
    async fn failed_send_leaves_reply_unrecorded() {
        let h = harness("resposta");
        h.channel.fail_sends(true);

        let err = h.pipeline.process(text_message("m1", "oi")).await.unwrap_err();
        assert!(matches!(err, DeskError::ChannelUnavailable));

        let messages = h.storage.messages();
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].from_me);
    }

    #[tokio::test]
    async fn media_message_is_downloaded_named_and_passed_to_assistant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegbytes".to_vec()))
            .mount(&server)
            .await;

        let h = harness("Recebi a foto do documento.");
        let mut msg = text_message("m1", "");
        msg.media = Some(InboundMedia {
            kind: MediaKind::Image,
            mime_type: "image/jpeg".into(),
            url: format!("{}/media/abc", server.uri()),
        });

        h.pipeline.process(msg).await.unwrap();

        let messages = h.storage.messages();
        assert_eq!(messages[0].media_kind, MediaKind::Image);
        let url = messages[0].media_url.as_deref().unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".jpg"), "got {url}");
        assert_eq!(messages[0].content, "[Arquivo: image]");

        let media_paths = h.assistant.media_paths();
        assert_eq!(media_paths.len(), 1);
        assert!(media_paths[0].is_some());
    }

    #[tokio::test]
    async fn media_caption_is_kept_as_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let h = harness("ok");
        let mut msg = text_message("m1", "segue o documento");
        msg.media = Some(InboundMedia {
            kind: MediaKind::Document,
            mime_type: "application/pdf".into(),
            url: format!("{}/media/abc", server.uri()),
        });

        h.pipeline.process(msg).await.unwrap();
        assert_eq!(h.storage.messages()[0].content, "segue o documento");
    }

    #[tokio::test]
    async fn media_download_failure_is_non_fatal() {
        let h = harness("resposta");
        let mut msg = text_message("m1", "");
        msg.media = Some(InboundMedia {
            kind: MediaKind::Audio,
            mime_type: "audio/ogg".into(),
            url: "http://127.0.0.1:1/media/gone".into(),
        });

        h.pipeline.process(msg).await.unwrap();

        let messages = h.storage.messages();
        assert_eq!(messages[0].content, DOWNLOAD_FAILURE_PLACEHOLDER);
        assert_eq!(messages[0].media_kind, MediaKind::Audio);
        assert!(messages[0].media_url.is_none());

        // The assistant still ran, with the placeholder text and no file.
        assert_eq!(h.assistant.call_count(), 1);
        assert_eq!(h.assistant.media_paths()[0], None);
        assert_eq!(h.channel.sent_texts(), vec!["resposta".to_string()]);
    }

    #[tokio::test]
    async fn composing_presence_precedes_generation() {
        let h = harness("resposta");
        h.pipeline.process(text_message("m1", "oi")).await.unwrap();
        assert_eq!(h.channel.presences(), vec!["composing".to_string()]);
    }

    #[tokio::test]
    async fn unseen_contact_defaults_to_cliente_novo() {
        let h = harness("resposta");
        let mut msg = text_message("m1", "oi");
        msg.push_name = None;
        h.pipeline.process(msg).await.unwrap();
        assert_eq!(h.storage.contact_names(), vec!["Cliente Novo".to_string()]);
    }
}
