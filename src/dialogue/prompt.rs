use super::RequestContext;
use crate::provider::FewShotExample;

/// Bumped whenever [`SYSTEM_INSTRUCTIONS`] or the few-shot example changes.
pub const INSTRUCTIONS_VERSION: u32 = 3;

pub const SYSTEM_INSTRUCTIONS: &str = r#"You are a dialogue system converter. Convert the given text into a JSON array of dialogue events based on these templates:

Narration format:
{
  "type": "narration",
  "text": "..."
}

Dialogue format:
{
  "type": "character",
  "speaker": "CharacterName",
  "text": "..."
}

Choice format:
{
  "type": "choice",
  "question": "Question text?",
  "options": ["option1", "option2", "option3"],
  "targetSequences": ["SCENE_X/SEQUENCE_YA", "SCENE_X/SEQUENCE_YB", "SCENE_X/SEQUENCE_YC"]
}

IMPORTANT RULES:
- Ignore frame numbers (like "FRAME 6", "Frame 7", etc.) - these are just reference labels, not content
- Ignore section headers like "Dialogue:", "Choice:", "Narration:" - these are just organizational labels
- Only convert actual content (character speech, narrative descriptions, choice questions/options)
- Do not wrap spoken text in quotation marks; strip the quotes surrounding a line of dialogue
- For character dialogue, extract the speaker name intelligently
- For choices, generate target sequences from the current scene and sequence, suffixed A, B, C... in option order
- The number of targetSequences must exactly match the number of options
- Return ONLY a valid JSON array, never an object wrapping the array, and no explanations"#;

const EXAMPLE_INPUT: &str = r#"FRAME 1
Narration:
The fog rolls over Baker Street.
Dialogue:
Holmes: "Watson, the game is afoot."
Choice:
Where should Watson go?
- Follow Holmes
- Stay at the flat"#;

const EXAMPLE_RESPONSE: &str = r#"[
  {"type": "narration", "text": "The fog rolls over Baker Street."},
  {"type": "character", "speaker": "Holmes", "text": "Watson, the game is afoot."},
  {"type": "choice", "question": "Where should Watson go?", "options": ["Follow Holmes", "Stay at the flat"], "targetSequences": ["SCENE_02/SEQUENCE_04A", "SCENE_02/SEQUENCE_04B"]}
]"#;

/// Builds the user prompt for `input_text` positioned at `context`.
pub fn build(input_text: &str, context: &RequestContext) -> String {
    let position = match &context.sequence_id {
        Some(sequence_id) => format!(
            "Current scene: {}. Current sequence: {sequence_id}",
            context.scene_id
        ),
        None => format!("Current scene: {}", context.scene_id),
    };
    let origin = match &context.sequence_id {
        Some(sequence_id) => format!("scene {} and sequence {sequence_id}", context.scene_id),
        None => format!("scene {}", context.scene_id),
    };

    format!(
        r#"Convert this text to JSON format. {position}

Input text:
{input}

Please analyze the text and convert it to the appropriate JSON format. If it contains a choice, derive the target sequences from {origin}, one per option, suffixed A, B, C... in option order. The number of target sequences must exactly match the number of options."#,
        input = input_text.trim(),
    )
}

/// The fixed example exchange sent ahead of every prompt.
pub fn few_shot_examples() -> Vec<FewShotExample> {
    let context = RequestContext::new(Some("SCENE_02"), Some("SEQUENCE_04"));
    vec![FewShotExample {
        prompt: build(EXAMPLE_INPUT, &context),
        response: EXAMPLE_RESPONSE.to_owned(),
    }]
}
