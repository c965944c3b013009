use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A store call failed; `context` names the operation that needed it.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    /// A window or spacing that leaves the representable date range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SchedulerError {
    pub(crate) fn store(context: &'static str) -> impl FnOnce(StoreError) -> SchedulerError {
        move |source| SchedulerError::Store { context, source }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
