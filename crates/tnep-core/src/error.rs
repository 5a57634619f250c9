//! Error type shared across the workspace.
//!
//! Loaders and grid construction fail with [`TnepError`]; the planning layer
//! has its own `DesignError` that converts to and from this one, so the
//! binary only has to know about a single type at the top.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TnepError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input text that could not be read as records
    #[error("Parse error: {0}")]
    Parse(String),

    /// Records that parsed but describe an invalid node or grid
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Solver error: {0}")]
    Solver(String),

    /// Line parameters, policies or settings out of range
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type TnepResult<T> = Result<T, TnepError>;

impl From<serde_json::Error> for TnepError {
    fn from(err: serde_json::Error) -> Self {
        TnepError::Parse(err.to_string())
    }
}

impl From<anyhow::Error> for TnepError {
    fn from(err: anyhow::Error) -> Self {
        TnepError::Other(format!("{err:#}"))
    }
}

impl TnepError {
    /// Bad files or records, as opposed to settings or solver trouble.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            TnepError::Io(_) | TnepError::Parse(_) | TnepError::Validation(_)
        )
    }
}
