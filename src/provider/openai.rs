use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, FewShotExample, conversation};
use crate::config::ProviderSettings;
use crate::error::TransportError;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat-completions backend.
pub struct OpenAi {
    client: reqwest::Client,
    api_key: String,
    settings: ProviderSettings,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, settings: ProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            settings,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(
        &self,
        system_instructions: &str,
        few_shot_examples: &[FewShotExample],
        user_prompt: &str,
    ) -> Result<String, TransportError> {
        let messages = std::iter::once(Message {
            role: "system",
            content: system_instructions.to_owned(),
        })
        .chain(
            conversation(few_shot_examples, user_prompt)
                .into_iter()
                .map(|(role, content)| Message { role, content }),
        )
        .collect();

        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let url = format!("{}/chat/completions", self.settings.base_url);
        tracing::debug!(url = %url, model = %self.settings.model, "sending completion request");

        let response: ChatCompletionResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TransportError::Envelope("no message content in choices".to_string()))
    }
}
