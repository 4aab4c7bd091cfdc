use std::path::PathBuf;

/// Core error type for the rememo pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A source form the IR cannot represent at all. Aborts the function.
    #[error("cannot lower `{function}`: {message}")]
    Structural { function: String, message: String },

    #[error("parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn structural(function: &str, message: impl Into<String>) -> Self {
        CoreError::Structural {
            function: function.to_string(),
            message: message.into(),
        }
    }
}
