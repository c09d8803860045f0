use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, FewShotExample, conversation};
use crate::config::ProviderSettings;
use crate::error::TransportError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    text: Option<String>,
}

/// Messages API backend.
pub struct Anthropic {
    client: reqwest::Client,
    api_key: String,
    settings: ProviderSettings,
}

impl Anthropic {
    pub fn new(api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            settings,
        }
    }
}

#[async_trait]
impl CompletionProvider for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(
        &self,
        system_instructions: &str,
        few_shot_examples: &[FewShotExample],
        user_prompt: &str,
    ) -> Result<String, TransportError> {
        let request = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: system_instructions,
            messages: conversation(few_shot_examples, user_prompt)
                .into_iter()
                .map(|(role, content)| Message { role, content })
                .collect(),
        };

        let url = format!("{}/messages", self.settings.base_url);
        tracing::debug!(url = %url, model = %self.settings.model, "sending completion request");

        let api_response: AnthropicResponse = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        api_response
            .content
            .into_iter()
            .find_map(|content| content.text)
            .ok_or_else(|| {
                TransportError::Envelope("no text content in Anthropic response".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> ProviderSettings {
        ProviderSettings {
            base_url: server.uri(),
            ..ProviderSettings::anthropic()
        }
    }

    #[tokio::test]
    async fn sends_system_separately_from_messages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "system": "rules",
                "messages": [
                    {"role": "user", "content": "example prompt"},
                    {"role": "assistant", "content": "[]"},
                    {"role": "user", "content": "convert this"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "```json\n[]\n```"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Anthropic::new("test-key", settings(&server));
        let examples = [FewShotExample {
            prompt: "example prompt".to_owned(),
            response: "[]".to_owned(),
        }];
        let text = provider
            .complete("rules", &examples, "convert this")
            .await
            .expect("completion");

        assert_eq!(text, "```json\n[]\n```");
    }

    #[tokio::test]
    async fn missing_text_block_is_a_malformed_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}]
            })))
            .mount(&server)
            .await;

        let provider = Anthropic::new("test-key", settings(&server));
        let error = provider.complete("rules", &[], "hi").await.unwrap_err();

        assert!(matches!(error, TransportError::Envelope(_)));
    }

    #[tokio::test]
    async fn server_error_is_a_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529))
            .mount(&server)
            .await;

        let provider = Anthropic::new("test-key", settings(&server));
        let error = provider.complete("rules", &[], "hi").await.unwrap_err();

        assert!(matches!(error, TransportError::Http(_)));
    }
}
