// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event router.
//!
//! Consumes the session manager's conversational event stream and dispatches
//! by kind: messages to the triage handler, composing presence to a typing
//! notification, delivery receipts to a message-status notification. A
//! failing handler is logged per event and never tears the stream down --
//! one bad event must not stop the ones behind it.
//!
//! Connection-lifecycle events are consumed by the session manager before
//! the stream reaches this router.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error};

use omnidesk_bus::{BusEvent, EventBus};
use omnidesk_core::{ChannelEvent, DeskError, InboundMessage, PresenceState};

/// How many recently-seen external message ids are remembered for
/// deduplication.
const DEDUP_WINDOW: usize = 512;

/// Handler for new conversational messages. Implementations must return
/// promptly (the triage dispatcher enqueues and processes on per-contact
/// workers) so the router preserves arrival order.
#[async_trait]
pub trait InboundHandler: Send + Sync + 'static {
    async fn handle_message(&self, msg: InboundMessage) -> Result<(), DeskError>;
}

/// Bounded window of recently seen message ids.
struct RecentIds {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentIds {
    fn new() -> Self {
        Self {
            order: VecDeque::with_capacity(DEDUP_WINDOW),
            seen: HashSet::with_capacity(DEDUP_WINDOW),
        }
    }

    /// Records an id; returns false if it was already in the window.
    fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() == DEDUP_WINDOW
            && let Some(evicted) = self.order.pop_front()
        {
            self.seen.remove(&evicted);
        }
        self.order.push_back(id.to_string());
        self.seen.insert(id.to_string());
        true
    }
}

/// Dispatches decoded channel events to their handlers.
pub struct EventRouter<H> {
    handler: H,
    bus: EventBus,
    recent: RecentIds,
}

impl<H: InboundHandler> EventRouter<H> {
    pub fn new(handler: H, bus: EventBus) -> Self {
        Self {
            handler,
            bus,
            recent: RecentIds::new(),
        }
    }

    /// Consumes the event stream until the sender side closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<ChannelEvent>) {
        while let Some(event) = events.recv().await {
            self.dispatch(event).await;
        }
        debug!("channel event stream ended, router stopping");
    }

    async fn dispatch(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(msg) => {
                if msg.from_me {
                    debug!(contact_id = %msg.contact_id, "ignoring self-sent echo");
                    return;
                }
                if !self.recent.insert(&msg.id) {
                    debug!(message_id = %msg.id, "dropping duplicate inbound message");
                    return;
                }
                let message_id = msg.id.clone();
                if let Err(e) = self.handler.handle_message(msg).await {
                    error!(message_id = %message_id, error = %e, "inbound message handler failed");
                }
            }
            ChannelEvent::Presence { contact_id, state } => {
                if state == PresenceState::Composing {
                    self.bus.publish(BusEvent::Typing { contact_id });
                }
            }
            ChannelEvent::Receipt { message_id, status } => {
                self.bus.publish(BusEvent::MessageStatus {
                    id: message_id,
                    status,
                });
            }
            other => {
                debug!(?other, "ignoring non-conversational event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingHandler {
        handled: Arc<Mutex<Vec<String>>>,
        fail_on: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl InboundHandler for RecordingHandler {
        async fn handle_message(&self, msg: InboundMessage) -> Result<(), DeskError> {
            if self.fail_on.lock().unwrap().as_deref() == Some(msg.id.as_str()) {
                return Err(DeskError::Internal("scripted handler failure".into()));
            }
            self.handled.lock().unwrap().push(msg.id);
            Ok(())
        }
    }

    fn message(id: &str, from_me: bool) -> ChannelEvent {
        ChannelEvent::Message(InboundMessage {
            id: id.into(),
            contact_id: "c-1".into(),
            push_name: None,
            from_me,
            text: Some("oi".into()),
            media: None,
        })
    }

    async fn run_router(
        handler: RecordingHandler,
        bus: EventBus,
        events: Vec<ChannelEvent>,
    ) {
        let (tx, rx) = mpsc::channel(64);
        for event in events {
            tx.try_send(event).unwrap();
        }
        drop(tx);
        EventRouter::new(handler, bus).run(rx).await;
    }

    #[tokio::test]
    async fn messages_reach_handler_in_order() {
        let handler = RecordingHandler::default();
        run_router(
            handler.clone(),
            EventBus::new(),
            vec![message("m1", false), message("m2", false), message("m3", false)],
        )
        .await;
        assert_eq!(
            *handler.handled.lock().unwrap(),
            vec!["m1".to_string(), "m2".into(), "m3".into()]
        );
    }

    #[tokio::test]
    async fn self_echoes_are_dropped() {
        let handler = RecordingHandler::default();
        run_router(
            handler.clone(),
            EventBus::new(),
            vec![message("m1", true), message("m2", false)],
        )
        .await;
        assert_eq!(*handler.handled.lock().unwrap(), vec!["m2".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_dropped() {
        let handler = RecordingHandler::default();
        run_router(
            handler.clone(),
            EventBus::new(),
            vec![message("m1", false), message("m1", false), message("m2", false)],
        )
        .await;
        assert_eq!(
            *handler.handled.lock().unwrap(),
            vec!["m1".to_string(), "m2".into()]
        );
    }

    #[tokio::test]
    async fn handler_failure_does_not_stop_the_stream() {
        let handler = RecordingHandler::default();
        *handler.fail_on.lock().unwrap() = Some("m2".into());
        run_router(
            handler.clone(),
            EventBus::new(),
            vec![message("m1", false), message("m2", false), message("m3", false)],
        )
        .await;
        assert_eq!(
            *handler.handled.lock().unwrap(),
            vec!["m1".to_string(), "m3".into()]
        );
    }

    #[tokio::test]
    async fn composing_presence_becomes_typing_notification() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        run_router(
            RecordingHandler::default(),
            bus,
            vec![
                ChannelEvent::Presence {
                    contact_id: "c-1".into(),
                    state: PresenceState::Composing,
                },
                ChannelEvent::Presence {
                    contact_id: "c-1".into(),
                    state: PresenceState::Paused,
                },
            ],
        )
        .await;

        assert_eq!(
            rx.try_recv().unwrap(),
            BusEvent::Typing {
                contact_id: "c-1".into()
            }
        );
        // Paused presence produced nothing.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn receipts_pass_through_in_received_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        run_router(
            RecordingHandler::default(),
            bus,
            vec![
                ChannelEvent::Receipt {
                    message_id: "w-1".into(),
                    status: 3,
                },
                ChannelEvent::Receipt {
                    message_id: "w-1".into(),
                    status: 4,
                },
                ChannelEvent::Receipt {
                    message_id: "w-1".into(),
                    status: 5,
                },
            ],
        )
        .await;

        let statuses: Vec<i64> = (0..3)
            .map(|_| match rx.try_recv().unwrap() {
                BusEvent::MessageStatus { status, .. } => status,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(statuses, vec![3, 4, 5]);
    }

    #[test]
    fn dedup_window_is_bounded() {
        let mut recent = RecentIds::new();
        for i in 0..(DEDUP_WINDOW + 10) {
            assert!(recent.insert(&format!("m{i}")));
        }
        assert_eq!(recent.order.len(), DEDUP_WINDOW);
        // The oldest ids were evicted and would be accepted again.
        assert!(recent.insert("m0"));
    }
}
