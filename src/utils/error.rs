use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Server {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Configuration error on '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Step card not found: {card_id}")]
    CardNotFound { card_id: String },

    #[error("Sequence not found: {sequence_id}")]
    SequenceNotFound { sequence_id: String },

    #[error("Cannot move step '{source_card}' into another sequence ('{target_card}')")]
    CrossSequenceMove {
        source_card: String,
        target_card: String,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Validation,
    Configuration,
    State,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::Transport(_) => ErrorCategory::Network,
            SyncError::Server { .. } => ErrorCategory::Server,
            SyncError::ValidationError { .. } => ErrorCategory::Validation,
            SyncError::ConfigValidationError { .. } | SyncError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            SyncError::CardNotFound { .. }
            | SyncError::SequenceNotFound { .. }
            | SyncError::CrossSequenceMove { .. } => ErrorCategory::State,
            SyncError::IoError(_) | SyncError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::State => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Server => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::Transport(_) => "Check that the campaign API is reachable and try again",
            SyncError::Server { status, .. } if *status == 404 => {
                "The sequence no longer exists on the server; reload the list"
            }
            SyncError::Server { .. } => "The server rejected the request; fix the input and retry",
            SyncError::ValidationError { .. } => "Fill in all required fields and retry",
            SyncError::ConfigValidationError { .. } | SyncError::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line overrides"
            }
            SyncError::CardNotFound { .. } | SyncError::SequenceNotFound { .. } => {
                "Reload the sequences; the local view is out of date"
            }
            SyncError::CrossSequenceMove { .. } => {
                "Steps can only be reordered inside their own sequence"
            }
            SyncError::IoError(_) => "Check file paths and permissions",
            SyncError::SerializationError(_) => "The server returned an unexpected payload",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::Transport(_) => "No response received from server".to_string(),
            SyncError::Server { message, .. } => message.clone(),
            SyncError::ValidationError { .. } => "Please fill in all required fields".to_string(),
            other => other.to_string(),
        }
    }
}
