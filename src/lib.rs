//! Converts freeform narrative text into visual-novel dialogue events.
//!
//! A [`CompletionProvider`] turns the prompt built by [`dialogue::prompt`]
//! into raw text, which [`dialogue::normalize`] validates into an ordered
//! list of [`DialogueEvent`]s.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod provider;

pub use dialogue::{DialogueEvent, RequestContext};
pub use error::{ConvertError, FormatError, MissingCredential, TransportError};
pub use provider::{CompletionProvider, FewShotExample, ProviderKind};

use dialogue::{normalize::normalize, prompt};

/// Converts `input_text` into dialogue events through `provider`.
pub async fn convert<P>(
    provider: &P,
    input_text: &str,
    context: &RequestContext,
) -> Result<Vec<DialogueEvent>, ConvertError>
where
    P: CompletionProvider + ?Sized,
{
    let input_text = input_text.trim();
    if input_text.is_empty() {
        return Err(ConvertError::EmptyInput);
    }

    let user_prompt = prompt::build(input_text, context);
    let raw = provider
        .complete(
            prompt::SYSTEM_INSTRUCTIONS,
            &prompt::few_shot_examples(),
            &user_prompt,
        )
        .await?;
    tracing::debug!(provider = provider.name(), raw = %raw, "completion received");

    let events = normalize(&raw)?;
    tracing::debug!(
        provider = provider.name(),
        scene = %context.scene_id,
        events = events.len(),
        "converted"
    );
    Ok(events)
}
