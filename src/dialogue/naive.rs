use super::{DialogueEvent, RequestContext};
use crate::error::FormatError;

const SECTION_HEADERS: [&str; 6] = [
    "dialogue",
    "dialogues",
    "narration",
    "choice",
    "choices",
    "options",
];

const MAX_SPEAKER_LEN: usize = 32;

/// Converts a script line by line without a completion provider.
pub fn produce(text: &str, context: &RequestContext) -> Result<Vec<DialogueEvent>, FormatError> {
    let mut events = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || is_frame_number(line) || is_section_header(line) {
            continue;
        }

        match option_text(line) {
            Some(option) => add_option(&mut events, option, number + 1)?,
            None => events.push(classify(line)),
        }
    }

    for (index, event) in events.iter_mut().enumerate() {
        if let DialogueEvent::Choice {
            options,
            target_sequences,
            ..
        } = event
        {
            *target_sequences = (0..options.len())
                .map(|position| context.target_sequence(position))
                .collect();
        }
        event.validate(index)?;
    }

    Ok(events)
}

fn classify(line: &str) -> DialogueEvent {
    match line.split_once(": ") {
        Some((speaker, words)) if is_speaker_label(speaker) && !words.trim().is_empty() => {
            DialogueEvent::CharacterLine {
                speaker: speaker.trim().to_owned(),
                text: strip_quotes(words.trim()).to_owned(),
            }
        }
        _ => DialogueEvent::Narration {
            text: line.to_owned(),
        },
    }
}

fn add_option(
    events: &mut Vec<DialogueEvent>,
    option: &str,
    line: usize,
) -> Result<(), FormatError> {
    if let Some(DialogueEvent::Choice { options, .. }) = events.last_mut() {
        options.push(option.to_owned());
        return Ok(());
    }

    let question = match events.last() {
        Some(DialogueEvent::Narration { text }) if text.ends_with('?') => text.clone(),
        _ => return Err(FormatError::OrphanOption { line }),
    };
    events.pop();
    events.push(DialogueEvent::Choice {
        question,
        options: vec![option.to_owned()],
        target_sequences: Vec::new(),
    });
    Ok(())
}

fn option_text(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .map(str::trim)
        .filter(|option| !option.is_empty())
}

fn is_speaker_label(label: &str) -> bool {
    let label = label.trim();
    !label.is_empty()
        && label.chars().count() <= MAX_SPEAKER_LEN
        && !label.contains(['.', '!', '?', '"', '“', '”'])
}

fn is_frame_number(line: &str) -> bool {
    let Some(rest) = line
        .get(..5)
        .filter(|word| word.eq_ignore_ascii_case("frame"))
        .map(|_| line[5..].trim().trim_end_matches(':'))
    else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

fn is_section_header(line: &str) -> bool {
    line.strip_suffix(':').is_some_and(|label| {
        SECTION_HEADERS
            .iter()
            .any(|header| label.trim().eq_ignore_ascii_case(header))
    })
}

fn strip_quotes(text: &str) -> &str {
    for (open, close) in [('"', '"'), ('“', '”')] {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_a_mixed_script() {
        let script = r#"
FRAME 6
Narration:
The fog rolls over Baker Street.
Dialogue:
Holmes: "Watson, the game is afoot."
Watson: Already?
Choice:
Where should Watson go?
- Follow Holmes
- Stay at the flat
"#;
        let context = RequestContext::new(Some("SCENE_02"), Some("SEQUENCE_04"));
        let events = produce(script, &context).unwrap();

        assert_eq!(
            events,
            vec![
                DialogueEvent::Narration {
                    text: "The fog rolls over Baker Street.".to_owned()
                },
                DialogueEvent::CharacterLine {
                    speaker: "Holmes".to_owned(),
                    text: "Watson, the game is afoot.".to_owned()
                },
                DialogueEvent::CharacterLine {
                    speaker: "Watson".to_owned(),
                    text: "Already?".to_owned()
                },
                DialogueEvent::Choice {
                    question: "Where should Watson go?".to_owned(),
                    options: vec!["Follow Holmes".to_owned(), "Stay at the flat".to_owned()],
                    target_sequences: vec![
                        "SCENE_02/SEQUENCE_04A".to_owned(),
                        "SCENE_02/SEQUENCE_04B".to_owned()
                    ],
                },
            ]
        );
    }

    #[test]
    fn sentences_with_colons_stay_narration() {
        let events = produce(
            "It was late. The note read: come alone.",
            &RequestContext::default(),
        )
        .unwrap();
        assert!(matches!(&events[..], [DialogueEvent::Narration { .. }]));
    }

    #[test]
    fn frame_labels_are_skipped() {
        assert!(is_frame_number("Frame 7"));
        assert!(is_frame_number("FRAME 12:"));
        assert!(!is_frame_number("Framed by the window, she waits."));
        assert!(!is_frame_number("Fr"));
    }

    #[test]
    fn option_without_question() {
        let error = produce("The door creaks.\n- Enter", &RequestContext::default()).unwrap_err();
        assert!(matches!(error, FormatError::OrphanOption { line: 2 }));
    }

    #[test]
    fn choice_longer_than_the_alphabet_is_rejected() {
        let options: String = (1..=27).map(|n| format!("- Door {n}\n")).collect();
        let script = format!("Which door?\n{options}");

        let error = produce(&script, &RequestContext::default()).unwrap_err();

        assert!(matches!(
            error,
            FormatError::TooManyOptions {
                index: 0,
                options: 27,
                ..
            }
        ));
    }

    #[test]
    fn blank_input_is_an_empty_script() {
        assert!(produce("\n  \n", &RequestContext::default()).unwrap().is_empty());
    }
}
