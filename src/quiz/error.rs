use thiserror::Error;

/// Everything that can go wrong between the data file, the bank and the store.
///
/// None of these reach the caller of `QuizService::select_question`; the
/// service turns them into fallback questions.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The data file is missing or can't be read.
    #[error("question source unavailable: {0}")]
    SourceUnavailable(String),

    /// The data file is there but isn't valid tabular data.
    #[error("failed to parse question source: {0}")]
    ParseFailure(String),

    /// The bank has no question in the requested category.
    #[error("no questions in category '{0}'")]
    NoSuchCategory(String),

    /// The category exists but nothing is left to serve, even after a reset.
    #[error("no unused questions left in category '{0}'")]
    PoolExhausted(String),

    /// Reading or writing the usage record failed.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<std::io::Error> for QuizError {
    fn from(err: std::io::Error) -> Self {
        QuizError::SourceUnavailable(err.to_string())
    }
}

impl From<csv::Error> for QuizError {
    fn from(err: csv::Error) -> Self {
        QuizError::ParseFailure(err.to_string())
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::PersistenceFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
