use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field was left empty. Shown to the user, state is kept.
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Action '{action}' is not available on the {screen} screen")]
    Transition {
        action: &'static str,
        screen: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// True when the user dismissed a prompt (Esc / Ctrl-C).
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Prompt(
                inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted
            )
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
