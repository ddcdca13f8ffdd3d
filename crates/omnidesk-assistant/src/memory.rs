// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile per-conversation memory.
//!
//! A plain text transcript per contact, held only in process memory: it is
//! NOT durable and resets on restart. When the window overflows the cap, the
//! oldest end is truncated and a marker is prefixed so the model can tell
//! the transcript is partial.

use std::collections::HashMap;

use tokio::sync::Mutex;

/// Transcript length at which truncation triggers.
const MEMORY_CAP: usize = 10_000;
/// Length kept (from the newest end) after truncation.
const MEMORY_KEEP: usize = 8_000;
/// Marker prefixed to a truncated transcript.
const TRUNCATION_MARKER: &str = "...";

/// Bounded sliding-window transcripts keyed by conversation id.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    transcripts: Mutex<HashMap<String, String>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current transcript for a conversation (empty if unseen).
    pub async fn transcript(&self, conversation_id: &str) -> String {
        self.transcripts
            .lock()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Appends one completed turn, truncating from the oldest end when the
    /// window exceeds the cap. Whole turns are appended atomically: the
    /// window is never cut mid-append.
    pub async fn append_turn(&self, conversation_id: &str, user_text: &str, reply_text: &str) {
        let mut transcripts = self.transcripts.lock().await;
        let transcript = transcripts.entry(conversation_id.to_string()).or_default();
        transcript.push_str(&format!(
            "\nCliente: \"{user_text}\"\nAtendente: \"{reply_text}\""
        ));

        if transcript.len() > MEMORY_CAP {
            let cut = transcript.len() - MEMORY_KEEP;
            // Cut on a char boundary so multi-byte text cannot split.
            let mut boundary = cut;
            while !transcript.is_char_boundary(boundary) {
                boundary += 1;
            }
            *transcript = format!("{TRUNCATION_MARKER}{}", &transcript[boundary..]);
        }
    }

    /// Drops the transcript for a conversation.
    pub async fn forget(&self, conversation_id: &str) {
        self.transcripts.lock().await.remove(conversation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseen_conversation_is_empty() {
        let memory = ConversationMemory::new();
        assert_eq!(memory.transcript("c-1").await, "");
    }

    #[tokio::test]
    async fn turns_accumulate_per_conversation() {
        let memory = ConversationMemory::new();
        memory.append_turn("c-1", "oi", "olá!").await;
        memory.append_turn("c-2", "hello", "hi").await;

        let transcript = memory.transcript("c-1").await;
        assert!(transcript.contains("Cliente: \"oi\""));
        assert!(transcript.contains("Atendente: \"olá!\""));
        assert!(!transcript.contains("hello"));
    }

    #[tokio::test]
    async fn overflow_truncates_oldest_with_marker() {
        let memory = ConversationMemory::new();
        let long = "x".repeat(3_000);
        for _ in 0..3 {
            memory.append_turn("c-1", &long, &long).await;
        }

        let transcript = memory.transcript("c-1").await;
        assert!(transcript.starts_with("..."));
        assert!(transcript.len() <= MEMORY_KEEP + TRUNCATION_MARKER.len());
    }

    #[tokio::test]
    async fn truncation_respects_char_boundaries() {
        let memory = ConversationMemory::new();
        let accented = "ã".repeat(2_000);
        for _ in 0..3 {
            memory.append_turn("c-1", &accented, &accented).await;
        }
        // Reaching here without a panic means no mid-char slice occurred.
        let transcript = memory.transcript("c-1").await;
        assert!(transcript.starts_with("..."));
    }

    #[tokio::test]
    async fn forget_clears_one_conversation() {
        let memory = ConversationMemory::new();
        memory.append_turn("c-1", "oi", "olá").await;
        memory.append_turn("c-2", "oi", "olá").await;
        memory.forget("c-1").await;
        assert_eq!(memory.transcript("c-1").await, "");
        assert!(!memory.transcript("c-2").await.is_empty());
    }
}
