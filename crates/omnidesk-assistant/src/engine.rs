// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assistant engine: prompt assembly, conversation memory, and the
//! fixed-apology failure contract.
//!
//! `generate` returns the provider's raw reply (embedded report block
//! included) -- stripping the block before delivery is the triage pipeline's
//! job. What goes into memory, however, is always the stripped text, so the
//! model is never re-fed its own hidden JSON.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;
use tracing::{debug, warn};

use omnidesk_config::model::AnthropicConfig;
use omnidesk_core::{AdapterType, Assistant, DeskError, HealthStatus, PluginAdapter};

use crate::client::AnthropicClient;
use crate::memory::ConversationMemory;
use crate::report;
use crate::types::{ApiContent, ApiContentBlock, ApiMessage, BlobSource, MessageRequest};

/// Fixed user-facing reply when generation fails for any reason.
pub const APOLOGY: &str = "Desculpe, o sistema está processando muitas informações. \
                           Pode repetir a última mensagem ou enviar em texto? 🙏";

/// Placeholder for the user turn when only media was sent.
const MEDIA_ONLY_PLACEHOLDER: &str = "[Arquivo de mídia enviado]";

/// Default system prompt: a warm triage attendant that closes conversations
/// with the hidden report block.
const DEFAULT_SYSTEM_PROMPT: &str = r#"IDENTIDADE: Você é a atendente de triagem de um escritório de advocacia previdenciária. Seja cordial, profissional e objetiva.

FLUXO: entenda o problema principal, faça UMA pergunta por vez (idade, tempo de contribuição, motivo do indeferimento) e encerre quando tiver o mínimo para o advogado analisar.

MULTIMODALIDADE: se receber áudio ou imagem de documento, confirme o recebimento e extraia as informações relevantes.

ENCERRAMENTO: ao encerrar o atendimento para passar ao humano, diga sua despedida e, imediatamente depois, gere um bloco JSON oculto EXATAMENTE assim (sem blocos de código markdown):

[REPORT_START]
{
  "cliente": "Nome identificado",
  "tema": "LOAS / Aposentadoria / Auxílio / Outros",
  "interpretacao": "Resumo técnico do caso",
  "atencao": "Pontos de urgência ou perfil do cliente",
  "sugestao": "Agendar Consulta / Pedir CNIS / Análise",
  "prioridade": "medium"
}
[REPORT_END]

REGRA FINAL: use apenas as tags [REPORT_START] e [REPORT_END], nunca ```json."#;

/// Assistant engine over the Anthropic Messages API.
pub struct AssistantEngine {
    client: AnthropicClient,
    memory: ConversationMemory,
    system_prompt: String,
    max_tokens: u32,
}

impl AssistantEngine {
    /// Builds the engine from configuration. Requires `anthropic.api_key`.
    pub fn new(config: &AnthropicConfig) -> Result<Self, DeskError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            DeskError::Config("anthropic.api_key is required for the assistant engine".into())
        })?;

        let system_prompt = match &config.system_prompt_file {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                DeskError::Config(format!("failed to read system_prompt_file {path}: {e}"))
            })?,
            None => config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        };

        let client = AnthropicClient::new(
            api_key,
            config.api_version.clone(),
            config.default_model.clone(),
        )?;

        Ok(Self {
            client,
            memory: ConversationMemory::new(),
            system_prompt,
            max_tokens: config.max_tokens,
        })
    }

    /// Overrides the API base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Assembles the user-turn content: history, the current message, and an
    /// optional inline media block.
    fn build_user_content(
        text: &str,
        history: &str,
        media: Option<(&str, &[u8])>,
    ) -> ApiContent {
        let shown_text = if text.is_empty() {
            MEDIA_ONLY_PLACEHOLDER
        } else {
            text
        };

        let prompt = format!(
            "--- HISTÓRICO RECENTE ---\n{history}\n\nCliente (mensagem atual): \"{shown_text}\""
        );

        let Some((mime_type, bytes)) = media else {
            return ApiContent::Text(prompt);
        };

        let mut blocks = vec![ApiContentBlock::Text { text: prompt }];

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let attached = if mime_type.starts_with("image/") {
            Some(ApiContentBlock::Image {
                source: BlobSource::base64(mime_type, encoded),
            })
        } else if mime_type == "application/pdf" {
            Some(ApiContentBlock::Document {
                source: BlobSource::base64(mime_type, encoded),
            })
        } else {
            None
        };

        match attached {
            Some(block) => {
                blocks.push(block);
                blocks.push(ApiContentBlock::Text {
                    text: "(O cliente enviou o arquivo acima. Analise o conteúdo dele junto com o texto.)".into(),
                });
            }
            None => {
                // The API cannot ingest this kind (audio etc.); tell the
                // model what arrived so it can acknowledge it.
                blocks.push(ApiContentBlock::Text {
                    text: format!(
                        "(O cliente enviou um arquivo do tipo {mime_type} que não pôde ser anexado. Peça as informações em texto se necessário.)"
                    ),
                });
            }
        }

        ApiContent::Blocks(blocks)
    }

    async fn try_generate(
        &self,
        text: &str,
        conversation_id: &str,
        media_path: Option<&Path>,
    ) -> Result<String, DeskError> {
        let history = self.memory.transcript(conversation_id).await;

        let media = match media_path {
            Some(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| DeskError::Media {
                    message: format!("failed to read media file {}: {e}", path.display()),
                    source: Some(Box::new(e)),
                })?;
                let mime_type = mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string();
                Some((mime_type, bytes))
            }
            None => None,
        };

        let content = Self::build_user_content(
            text,
            &history,
            media.as_ref().map(|(m, b)| (m.as_str(), b.as_slice())),
        );

        let request = MessageRequest {
            model: self.client.default_model().to_string(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content,
            }],
            system: Some(self.system_prompt.clone()),
            max_tokens: self.max_tokens,
            stream: false,
        };

        let response = self.client.complete_message(&request).await?;
        let raw = response.text();

        // Memory stores the stripped reply; the raw one goes to the caller.
        let clean = report::strip_block(&raw);
        let user_part = if text.is_empty() { "[Mídia]" } else { text };
        self.memory.append_turn(conversation_id, user_part, &clean).await;

        debug!(
            conversation_id,
            output_tokens = response.usage.output_tokens,
            "assistant reply generated"
        );
        Ok(raw)
    }
}

#[async_trait]
impl Assistant for AssistantEngine {
    async fn generate(
        &self,
        text: &str,
        conversation_id: &str,
        media_path: Option<&Path>,
    ) -> String {
        match self.try_generate(text, conversation_id, media_path).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(conversation_id, error = %e, "assistant generation failed");
                APOLOGY.to_string()
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for AssistantEngine {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskError> {
        // Construction already validated credentials and prompt sources.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("test-key".into()),
            ..Default::default()
        }
    }

    fn engine_for(server: &MockServer) -> AssistantEngine {
        AssistantEngine::new(&test_config())
            .unwrap()
            .with_base_url(server.uri())
    }

    fn reply_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 50, "output_tokens": 20}
        })
    }

    #[test]
    fn new_requires_api_key() {
        let config = AnthropicConfig::default();
        assert!(AssistantEngine::new(&config).is_err());
    }

    #[test]
    fn inline_system_prompt_overrides_default() {
        let config = AnthropicConfig {
            api_key: Some("k".into()),
            system_prompt: Some("atenda em inglês".into()),
            ..Default::default()
        };
        let engine = AssistantEngine::new(&config).unwrap();
        assert_eq!(engine.system_prompt, "atenda em inglês");
    }

    #[test]
    fn user_content_without_media_is_plain_text() {
        let content = AssistantEngine::build_user_content("oi", "histórico", None);
        match content {
            ApiContent::Text(text) => {
                assert!(text.contains("histórico"));
                assert!(text.contains("Cliente (mensagem atual): \"oi\""));
            }
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn empty_text_uses_media_placeholder() {
        let content = AssistantEngine::build_user_content("", "", None);
        match content {
            ApiContent::Text(text) => assert!(text.contains(MEDIA_ONLY_PLACEHOLDER)),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn image_media_becomes_inline_block() {
        let content =
            AssistantEngine::build_user_content("foto", "", Some(("image/jpeg", b"bytes")));
        match content {
            ApiContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 3);
                assert!(matches!(blocks[1], ApiContentBlock::Image { .. }));
            }
            other => panic!("expected Blocks, got {other:?}"),
        }
    }

    #[test]
    fn audio_media_becomes_note() {
        let content =
            AssistantEngine::build_user_content("áudio", "", Some(("audio/ogg", b"bytes")));
        match content {
            ApiContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 2);
                match &blocks[1] {
                    ApiContentBlock::Text { text } => assert!(text.contains("audio/ogg")),
                    other => panic!("expected note, got {other:?}"),
                }
            }
            other => panic!("expected Blocks, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_returns_raw_and_memorizes_stripped() {
        let server = MockServer::start().await;
        let raw = "Até logo! [REPORT_START]{\"tema\":\"LOAS\"}[REPORT_END]";
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(raw)))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let reply = engine.generate("meu benefício foi negado", "c-1", None).await;
        assert_eq!(reply, raw);

        let transcript = engine.memory.transcript("c-1").await;
        assert!(transcript.contains("Até logo!"));
        assert!(!transcript.contains("REPORT_START"));
        assert!(transcript.contains("meu benefício foi negado"));
    }

    #[tokio::test]
    async fn generate_failure_returns_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"type": "api_error", "message": "boom"}
            })))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        let reply = engine.generate("oi", "c-1", None).await;
        assert_eq!(reply, APOLOGY);
        // A failed turn leaves no memory behind.
        assert_eq!(engine.memory.transcript("c-1").await, "");
    }

    #[tokio::test]
    async fn missing_media_file_returns_apology() {
        let server = MockServer::start().await;
        let engine = engine_for(&server);
        let reply = engine
            .generate("foto", "c-1", Some(Path::new("/nonexistent/file.jpg")))
            .await;
        assert_eq!(reply, APOLOGY);
    }

    #[tokio::test]
    async fn history_flows_into_next_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Entendi.")))
            .mount(&server)
            .await;

        let engine = engine_for(&server);
        engine.generate("primeira", "c-1", None).await;
        let history = engine.memory.transcript("c-1").await;
        assert!(history.contains("primeira"));

        // Second call builds on non-empty history without error.
        let reply = engine.generate("segunda", "c-1", None).await;
        assert_eq!(reply, "Entendi.");
    }
}
