/// Result alias that carries the custom [`BackdropError`] type.
pub type Result<T> = std::result::Result<T, BackdropError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum BackdropError {
    /// Free-form failure, mostly surfaced from the windowing layer.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Preset or report (de)serialization failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value outside of the range the scene builder accepts.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    /// Color strings must look like `#rrggbb`.
    #[error("invalid color `{0}`, expected `#rrggbb`")]
    InvalidColor(String),
}

impl BackdropError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<String> for BackdropError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
