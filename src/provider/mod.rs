pub mod anthropic;
pub mod openai;

use async_trait::async_trait;
use strum::{Display, EnumString};

use crate::config::{Config, Environment};
use crate::error::{MissingCredential, TransportError};

/// A prompt and the reply the model is expected to give for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FewShotExample {
    pub prompt: String,
    pub response: String,
}

/// A language-model backend that turns a prompt into free text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    async fn complete(
        &self,
        system_instructions: &str,
        few_shot_examples: &[FewShotExample],
        user_prompt: &str,
    ) -> Result<String, TransportError>;
}

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn credential_variable(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Builds the provider from its credential and settings.
    pub fn build(
        self,
        environment: &Environment,
        config: &Config,
    ) -> Result<Box<dyn CompletionProvider>, MissingCredential> {
        let api_key = match self {
            ProviderKind::OpenAi => environment.openai_api_key.as_deref(),
            ProviderKind::Anthropic => environment.anthropic_api_key.as_deref(),
        }
        .ok_or(MissingCredential {
            variable: self.credential_variable(),
        })?;

        let provider: Box<dyn CompletionProvider> = match self {
            ProviderKind::OpenAi => Box::new(openai::OpenAi::new(api_key, config.openai.clone())),
            ProviderKind::Anthropic => {
                Box::new(anthropic::Anthropic::new(api_key, config.anthropic.clone()))
            }
        };
        Ok(provider)
    }
}

/// Chat roles shared by both wire formats.
pub(crate) fn conversation(
    few_shot_examples: &[FewShotExample],
    user_prompt: &str,
) -> Vec<(&'static str, String)> {
    few_shot_examples
        .iter()
        .flat_map(|example| {
            [
                ("user", example.prompt.clone()),
                ("assistant", example.response.clone()),
            ]
        })
        .chain(std::iter::once(("user", user_prompt.to_owned())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_kind_parses_lowercase() {
        assert_eq!(ProviderKind::from_str("openai").unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            ProviderKind::from_str("anthropic").unwrap(),
            ProviderKind::Anthropic
        );
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
        assert!(ProviderKind::from_str("gemini").is_err());
    }

    #[test]
    fn build_picks_the_matching_backend() {
        let environment = Environment {
            openai_api_key: Some("sk-test".to_owned()),
            anthropic_api_key: Some("sk-ant-test".to_owned()),
        };
        let config = Config::default();

        let openai = ProviderKind::OpenAi.build(&environment, &config).unwrap();
        let anthropic = ProviderKind::Anthropic.build(&environment, &config).unwrap();

        assert_eq!(openai.name(), "openai");
        assert_eq!(anthropic.name(), "anthropic");
    }

    #[test]
    fn build_without_credential_names_the_variable() {
        let environment = Environment {
            openai_api_key: Some("sk-test".to_owned()),
            anthropic_api_key: None,
        };

        let error = ProviderKind::Anthropic
            .build(&environment, &Config::default())
            .err()
            .expect("missing key");

        assert_eq!(error.variable, "ANTHROPIC_API_KEY");
        assert_eq!(
            error.to_string(),
            "ANTHROPIC_API_KEY environment variable not set"
        );
    }

    #[test]
    fn conversation_interleaves_examples_before_prompt() {
        let examples = [FewShotExample {
            prompt: "p".to_owned(),
            response: "r".to_owned(),
        }];
        assert_eq!(
            conversation(&examples, "now"),
            vec![
                ("user", "p".to_owned()),
                ("assistant", "r".to_owned()),
                ("user", "now".to_owned()),
            ]
        );
    }
}
