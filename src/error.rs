use thiserror::Error;

/// Failure talking to the completion provider.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed completion envelope: {0}")]
    Envelope(String),
}

/// The provider's reply could not be turned into dialogue events.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unparseable: {0}")]
    Unparseable(#[source] serde_json::Error),

    #[error("no array found in wrapper object")]
    NoArrayFound,

    #[error("expected array, found {0}")]
    ExpectedArray(&'static str),

    #[error("event {index} is not a valid dialogue event: {source}")]
    InvalidEvent {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("choice at event {index} has no options")]
    EmptyOptions { index: usize },

    #[error("choice at event {index} has {options} options, more than the {max} suffix letters")]
    TooManyOptions {
        index: usize,
        options: usize,
        max: usize,
    },

    #[error("choice at event {index} has {options} options but {targets} target sequences")]
    ChoiceArity {
        index: usize,
        options: usize,
        targets: usize,
    },

    #[error("option on line {line} has no preceding question")]
    OrphanOption { line: usize },
}

/// The selected provider has no API key in the environment.
#[derive(Debug, Error)]
#[error("{variable} environment variable not set")]
pub struct MissingCredential {
    pub variable: &'static str,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input text is empty")]
    EmptyInput,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
