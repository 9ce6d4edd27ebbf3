use std::path::PathBuf;

/// Result alias that carries the custom [`SceneError`] type.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Free-form message for failures that have no dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A caller handed over a value the operation cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// Snapshot or font JSON could not be read or written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// An asset was missing or could not be decoded.
    #[error("failed to load asset `{}`: {reason}", path.display())]
    Asset { path: PathBuf, reason: String },
    /// The debug panel has no binding with this name.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
}

impl SceneError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn asset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Asset {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<&str> for SceneError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SceneError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
