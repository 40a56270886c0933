use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("no `<@USER>` mention found in `{text}`")]
    MissingMention { text: String },
    #[error("request carries neither `user_id` nor `user_name`")]
    MissingRequester,
    #[error("malformed block record: {0}")]
    MalformedRecord(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("webhook token mismatch")]
    Unauthorized,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Text sent back to the channel. Infrastructure failures answer with an
    /// empty body so the transport call still completes.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Invalid token",
            Self::Domain(DomainError::MissingMention { .. }) => "Invalid blocker",
            Self::Domain(DomainError::MissingRequester) => "Invalid request",
            Self::Domain(DomainError::MalformedRecord(_))
            | Self::Persistence(_)
            | Self::Configuration(_) => "",
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Domain(DomainError::MalformedRecord(_))
                | Self::Persistence(_)
                | Self::Configuration(_)
        )
    }
}
