use thiserror::Error;

/// Core error types for panctl
#[derive(Debug, Error)]
pub enum Error {
    /// Local field validation failed; never reaches the network
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// Backend reports the entity absent
    #[error("{entity} not found: {value}")]
    NotFound { entity: String, value: String },

    /// Name already taken on the backend
    #[error("{entity} '{name}' already exists")]
    Conflict { entity: String, name: String },

    /// Network failure or a backend-reported failure
    #[error("Backend error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded or is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            value: value.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Conflict {
            entity: entity.into(),
            name: name.into(),
        }
    }

    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
        }
    }

    /// Field the error belongs to, if it should be shown inline
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// User-facing translation for banners and CLI output
    pub fn translate(&self) -> ErrorTranslation {
        match self {
            Self::Validation { message, .. } => ErrorTranslation::new(message.clone()),
            Self::NotFound { entity, value } => {
                ErrorTranslation::new(format!("No {entity} matches '{value}'"))
                    .with_suggestion(format!("Create a new {entity} for this value"))
            }
            Self::Conflict { entity, name } => {
                ErrorTranslation::new(format!("{entity} name '{name}' is already in use"))
                    .with_suggestion("Pick a different name")
            }
            Self::Transport { message, status } => {
                BackendErrorPattern::match_error(message, *status)
            }
            Self::Io(e) => ErrorTranslation::new(format!("File operation failed: {e}"))
                .with_suggestion("Check permissions on the panctl data directory"),
            Self::Serialization(e) => {
                ErrorTranslation::new(format!("Unexpected data format: {e}"))
                    .with_suggestion("The backend may be running an incompatible version")
            }
            Self::Config(msg) => ErrorTranslation::new(format!("Configuration problem: {msg}"))
                .with_suggestion("Delete config.json to restore defaults"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        Self::Transport {
            message: e.to_string(),
            status,
        }
    }
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Known backend/transport failure patterns and their translations
pub struct BackendErrorPattern;

impl BackendErrorPattern {
    pub fn match_error(msg: &str, status: Option<u16>) -> ErrorTranslation {
        let lower = msg.to_lowercase();

        if lower.contains("connection refused")
            || lower.contains("error sending request")
            || lower.contains("dns error")
        {
            return ErrorTranslation::new("Cannot reach the policy backend")
                .with_suggestion("Check that the backend service is running")
                .with_suggestion("Verify the backend URL (config.json, PANCTL_BACKEND_URL or --backend)");
        }

        if lower.contains("timed out") || lower.contains("timeout") {
            return ErrorTranslation::new("The backend did not answer in time")
                .with_suggestion("Panorama commits can be slow; try again shortly")
                .with_suggestion("Raise request_timeout_secs in config.json");
        }

        if matches!(status, Some(401 | 403)) || lower.contains("unauthorized") {
            return ErrorTranslation::new("The backend rejected the request credentials")
                .with_suggestion("Check the API key configured on the backend");
        }

        if lower.contains("already exists") {
            return ErrorTranslation::new(msg.to_string())
                .with_suggestion("Pick a different name or reuse the existing object");
        }

        if let Some(code) = status
            && code >= 500
        {
            return ErrorTranslation::new(format!("Backend failure ({code}): {msg}"))
                .with_suggestion("Check the backend logs for details");
        }

        ErrorTranslation::new(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
