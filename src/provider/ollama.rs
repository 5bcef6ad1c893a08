//! Ollama-backed analysis provider.
//!
//! Every check is a non-streaming call to Ollama's `/api/chat` endpoint with
//! a JSON schema as the structured output format. Translation takes two
//! calls: language detection first, then the directional translation.

use super::prompts::{self, SYSTEM_PROMPT};
use super::schema::{
    self, parse_reply, DetectedLanguage, DetectionReply, EnglishToTamilReply, TamilToEnglishReply,
};
use super::{AnalysisError, AnalysisProvider};
use crate::models::{
    CheckKind, IdiomResult, SpellCheckResult, Tone, TranslationResult, VocabularyResult,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 120,
        }
    }
}

/// Message in the chat request.
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    format: Value,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Analysis provider talking to an Ollama server.
pub struct OllamaProvider {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider; the HTTP client is shared by every check.
    pub fn new(config: OllamaConfig) -> Result<Self, AnalysisError> {
        info!(
            "Initializing Ollama provider with model {} at {}",
            config.model_name, config.ollama_url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Send one prompt and parse the reply into `T`.
    async fn ask<T: DeserializeOwned>(
        &self,
        check: CheckKind,
        prompt: String,
        format: Value,
    ) -> Result<T, AnalysisError> {
        let content = self.send_prompt(prompt, format).await?;
        parse_reply(check, &content)
    }

    /// Send a prompt and return the raw reply content.
    async fn send_prompt(&self, prompt: String, format: Value) -> Result<String, AnalysisError> {
        let url = format!("{}/api/chat", self.config.ollama_url.trim_end_matches('/'));

        debug!("Sending prompt of {} bytes to {}", prompt.len(), url);

        let request = OllamaChatRequest {
            model: &self.config.model_name,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            format,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    AnalysisError::Connect(self.config.ollama_url.clone())
                } else {
                    AnalysisError::Transport(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response.json().await?;

        debug!(
            "Received reply of {} bytes",
            chat_response.message.content.len()
        );

        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl AnalysisProvider for OllamaProvider {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn check_spelling(&self, text: &str) -> Result<SpellCheckResult, AnalysisError> {
        self.ask(
            CheckKind::Spelling,
            prompts::spelling_prompt(text),
            schema::spelling_schema(),
        )
        .await
    }

    async fn translate(&self, text: &str) -> Result<TranslationResult, AnalysisError> {
        let detection: DetectionReply = self
            .ask(
                CheckKind::Translation,
                prompts::language_detection_prompt(text),
                schema::language_detection_schema(),
            )
            .await?;

        debug!("Detected language: {:?}", detection.language);

        match detection.language {
            DetectedLanguage::Tamil => {
                let reply: TamilToEnglishReply = self
                    .ask(
                        CheckKind::Translation,
                        prompts::tamil_to_english_prompt(text),
                        schema::tamil_to_english_schema(),
                    )
                    .await?;
                Ok(TranslationResult::from_tamil(reply.english_translation))
            }
            DetectedLanguage::English => {
                let reply: EnglishToTamilReply = self
                    .ask(
                        CheckKind::Translation,
                        prompts::english_to_tamil_prompt(text),
                        schema::english_to_tamil_schema(),
                    )
                    .await?;
                Ok(TranslationResult::from_english(
                    reply.tamil_translation,
                    reply.thanglish_transcription,
                ))
            }
            DetectedLanguage::Unknown => Err(AnalysisError::LanguageUndetermined),
        }
    }

    async fn enhance_vocabulary(
        &self,
        text: &str,
        tone: Tone,
    ) -> Result<VocabularyResult, AnalysisError> {
        self.ask(
            CheckKind::Vocabulary,
            prompts::vocabulary_prompt(text, tone),
            schema::vocabulary_schema(),
        )
        .await
    }

    async fn suggest_idioms(&self, text: &str) -> Result<IdiomResult, AnalysisError> {
        self.ask(
            CheckKind::Idioms,
            prompts::idioms_prompt(text),
            schema::idioms_schema(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve one canned `/api/chat` reply per connection, in order.
    /// The handle yields the request bodies that were received.
    async fn stub_server(replies: Vec<Value>) -> (String, JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for reply in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request_body(&mut socket).await);

                let body = json!({
                    "model": "stub",
                    "message": { "role": "assistant", "content": reply.to_string() },
                    "done": true
                })
                .to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            requests
        });

        (url, handle)
    }

    async fn read_request_body(socket: &mut TcpStream) -> Value {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request body arrived");
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let body_start = header_end + 4;
            if buf.len() >= body_start + length {
                return serde_json::from_slice(&buf[body_start..body_start + length]).unwrap();
            }
        }
    }

    fn stub_provider(url: String) -> OllamaProvider {
        OllamaProvider::new(OllamaConfig {
            ollama_url: url,
            timeout_seconds: 5,
            ..OllamaConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_ollama_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.model_name, "llama3.2:latest");
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn test_provider_name_is_model() {
        let provider = OllamaProvider::new(OllamaConfig {
            model_name: "gemma3:12b".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();
        assert_eq!(provider.name(), "gemma3:12b");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = OllamaChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi".to_string(),
            }],
            stream: false,
            format: schema::idioms_schema(),
            options: OllamaOptions { temperature: 0.1 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["format"]["required"][0], "suggestions");
    }

    #[tokio::test]
    async fn test_translate_unknown_language() {
        let (url, server) = stub_server(vec![json!({ "language": "Unknown" })]).await;
        let provider = stub_provider(url);

        let err = provider.translate("12345 !!!").await.unwrap_err();

        assert!(matches!(err, AnalysisError::LanguageUndetermined));
        assert_eq!(
            err.to_string(),
            "Could not determine the language of the provided text. Please provide either Tamil or English text."
        );
        // No translation request after an undetermined detection
        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["format"]["required"][0], "language");
    }

    #[tokio::test]
    async fn test_translate_tamil_to_english() {
        let (url, server) = stub_server(vec![
            json!({ "language": "Tamil" }),
            json!({ "englishTranslation": "I ate food" }),
        ])
        .await;
        let provider = stub_provider(url);

        let result = provider.translate("நான் உணவு சாப்பிட்டேன்").await.unwrap();

        assert_eq!(result, TranslationResult::from_tamil("I ate food".to_string()));
        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1]["stream"], false);
        assert_eq!(requests[1]["format"]["required"][0], "englishTranslation");
    }

    #[tokio::test]
    async fn test_translate_english_to_tamil() {
        let (url, server) = stub_server(vec![
            json!({ "language": "English" }),
            json!({ "tamilTranslation": "வணக்கம்", "thanglishTranscription": "vanakkam" }),
        ])
        .await;
        let provider = stub_provider(url);

        let result = provider.translate("Hello").await.unwrap();

        assert_eq!(
            result,
            TranslationResult::from_english("வணக்கம்".to_string(), "vanakkam".to_string())
        );
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_error_reply_is_reported() {
        let (url, server) = stub_server(vec![json!({ "error": "Text is too short." })]).await;
        let provider = stub_provider(url);

        let err = provider.suggest_idioms("ஆ").await.unwrap_err();

        assert!(matches!(err, AnalysisError::Reported(ref message) if message == "Text is too short."));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let provider = OllamaProvider::new(OllamaConfig {
            ollama_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..OllamaConfig::default()
        })
        .unwrap();

        let result = provider.suggest_idioms("வணக்கம்").await;
        assert!(matches!(
            result,
            Err(AnalysisError::Connect(_))
                | Err(AnalysisError::Timeout(_))
                | Err(AnalysisError::Transport(_))
        ));
    }
}
