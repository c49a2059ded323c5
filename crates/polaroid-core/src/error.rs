use std::fmt;

/// Steps of the like chain that run after the like itself is durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeStep {
    NotifyLike,
    MatchCheck,
    NotifyMatch,
}

impl fmt::Display for LikeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotifyLike => "like notification",
            Self::MatchCheck => "match check",
            Self::NotifyMatch => "match notification",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not a participant of this match")]
    Forbidden,

    #[error("{0} already taken")]
    Conflict(&'static str),

    #[error("persistence error: {0}")]
    Persistence(#[from] anyhow::Error),

    /// Earlier steps of the sequence stay committed; nothing is rolled back.
    #[error("{step} failed after the like was recorded: {source}")]
    PartialFailure {
        step: LikeStep,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn partial(step: LikeStep) -> impl FnOnce(Error) -> Error {
        move |source| Error::PartialFailure {
            step,
            source: Box::new(source),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
