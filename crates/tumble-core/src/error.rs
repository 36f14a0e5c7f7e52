//! Error types for Tumble

use thiserror::Error;

/// The main error type for Tumble operations
#[derive(Debug, Error)]
pub enum TumbleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Action id {raw} out of range (max {max})")]
    ActionOutOfRange { raw: i64, max: u16 },

    #[error("Duplicate action {action} in catalog '{model}'")]
    DuplicateAction { model: String, action: u16 },

    #[error("Invalid clip '{clip}' in catalog '{model}': {reason}")]
    InvalidClip {
        model: String,
        clip: String,
        reason: String,
    },

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Actor not found: {0}")]
    ActorNotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Script error: {0}")]
    ScriptError(String),
}

/// Result type alias for Tumble operations
pub type Result<T> = std::result::Result<T, TumbleError>;

impl From<toml::de::Error> for TumbleError {
    fn from(err: toml::de::Error) -> Self {
        TumbleError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: TumbleError = toml::from_str::<toml::Table>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, TumbleError::TomlParseError(_)));
    }

    #[test]
    fn invalid_clip_message_names_model_and_clip() {
        let err = TumbleError::InvalidClip {
            model: "hero".into(),
            clip: "walk".into(),
            reason: "duration below 1.0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("hero"));
        assert!(msg.contains("walk"));
    }
}
