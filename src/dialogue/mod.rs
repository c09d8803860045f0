pub mod naive;
pub mod normalize;
pub mod prompt;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

pub const DEFAULT_SCENE_ID: &str = "SCENE_01";
pub const DEFAULT_SEQUENCE_ID: &str = "SEQUENCE_01";

/// One option per target suffix letter, `A` through `Z`.
pub const MAX_CHOICE_OPTIONS: usize = 26;

/// One playable unit of narrative content, in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEvent {
    Narration {
        text: String,
    },
    #[serde(rename = "character")]
    CharacterLine {
        speaker: String,
        text: String,
    },
    Choice {
        question: String,
        options: Vec<String>,
        #[serde(rename = "targetSequences")]
        target_sequences: Vec<String>,
    },
}

impl DialogueEvent {
    /// Checks the choice invariants: between one and [`MAX_CHOICE_OPTIONS`] options, one target
    /// per option.
    pub fn validate(&self, index: usize) -> Result<(), FormatError> {
        if let DialogueEvent::Choice {
            options,
            target_sequences,
            ..
        } = self
        {
            if options.is_empty() {
                return Err(FormatError::EmptyOptions { index });
            }
            if options.len() > MAX_CHOICE_OPTIONS {
                return Err(FormatError::TooManyOptions {
                    index,
                    options: options.len(),
                    max: MAX_CHOICE_OPTIONS,
                });
            }
            if options.len() != target_sequences.len() {
                return Err(FormatError::ChoiceArity {
                    index,
                    options: options.len(),
                    targets: target_sequences.len(),
                });
            }
        }
        Ok(())
    }
}

/// Where in the script the converted text lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub scene_id: String,
    pub sequence_id: Option<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            scene_id: DEFAULT_SCENE_ID.to_owned(),
            sequence_id: None,
        }
    }
}

impl RequestContext {
    pub fn new(scene_id: Option<&str>, sequence_id: Option<&str>) -> Self {
        Self {
            scene_id: scene_id
                .map(str::trim)
                .filter(|scene| !scene.is_empty())
                .unwrap_or(DEFAULT_SCENE_ID)
                .to_owned(),
            sequence_id: sequence_id
                .map(str::trim)
                .filter(|sequence| !sequence.is_empty())
                .map(str::to_owned),
        }
    }

    /// `<SCENE_ID>/<SEQUENCE_ID><LETTER>` for the option at `index`.
    ///
    /// Only the first [`MAX_CHOICE_OPTIONS`] positions have a letter of their own; a choice
    /// longer than that fails [`DialogueEvent::validate`].
    pub fn target_sequence(&self, index: usize) -> String {
        format!(
            "{}/{}{}",
            self.scene_id,
            self.sequence_id.as_deref().unwrap_or(DEFAULT_SEQUENCE_ID),
            suffix_letter(index)
        )
    }
}

fn suffix_letter(index: usize) -> char {
    (b'A' + (index % MAX_CHOICE_OPTIONS) as u8) as char
}

/// Whether `target` has the `<SCENE>/<SEQUENCE><LETTER>` shape.
pub fn is_well_formed_target(target: &str) -> bool {
    let Some((scene, sequence)) = target.split_once('/') else {
        return false;
    };
    let mut chars = sequence.chars();
    let last = chars.next_back();
    !scene.is_empty()
        && !chars.as_str().is_empty()
        && last.is_some_and(|letter| letter.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_defaults_scene() {
        let context = RequestContext::new(None, Some("  "));
        assert_eq!(context.scene_id, "SCENE_01");
        assert_eq!(context.sequence_id, None);
    }

    #[test]
    fn target_sequences_follow_option_position() {
        let context = RequestContext::new(Some("SCENE_03"), Some("SEQUENCE_02"));
        assert_eq!(context.target_sequence(0), "SCENE_03/SEQUENCE_02A");
        assert_eq!(context.target_sequence(2), "SCENE_03/SEQUENCE_02C");
        assert_eq!(
            RequestContext::default().target_sequence(1),
            "SCENE_01/SEQUENCE_01B"
        );
    }

    #[test]
    fn target_shape() {
        assert!(is_well_formed_target("SCENE_01/SEQUENCE_01A"));
        assert!(!is_well_formed_target("SCENE_01SEQUENCE_01A"));
        assert!(!is_well_formed_target("SCENE_01/SEQUENCE_01a"));
        assert!(!is_well_formed_target("SCENE_01/A"));
    }

    #[test]
    fn choice_arity_is_enforced() {
        let choice = DialogueEvent::Choice {
            question: "Which way?".to_owned(),
            options: vec!["Left".to_owned(), "Right".to_owned(), "Back".to_owned()],
            target_sequences: vec!["S/QA".to_owned(), "S/QB".to_owned()],
        };
        assert!(matches!(
            choice.validate(4),
            Err(FormatError::ChoiceArity {
                index: 4,
                options: 3,
                targets: 2
            })
        ));
    }

    #[test]
    fn choices_are_capped_at_one_option_per_letter() {
        let context = RequestContext::default();
        let choice = |count: usize| DialogueEvent::Choice {
            question: "Pick a letter?".to_owned(),
            options: (0..count).map(|n| format!("Option {n}")).collect(),
            target_sequences: (0..count).map(|n| context.target_sequence(n)).collect(),
        };

        assert!(choice(MAX_CHOICE_OPTIONS).validate(0).is_ok());
        assert_eq!(context.target_sequence(25), "SCENE_01/SEQUENCE_01Z");
        assert!(matches!(
            choice(MAX_CHOICE_OPTIONS + 1).validate(2),
            Err(FormatError::TooManyOptions {
                index: 2,
                options: 27,
                max: 26
            })
        ));
    }

    #[test]
    fn serializes_with_wire_tags() {
        let event = DialogueEvent::CharacterLine {
            speaker: "Holmes".to_owned(),
            text: "Elementary.".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "character", "speaker": "Holmes", "text": "Elementary."})
        );
    }
}
