use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Source '{source_name}' unavailable: {message}")]
    SourceUnavailable { source_name: String, message: String },

    #[error("Cannot persist calendar for {year}: {message}")]
    PersistenceFailure { year: i32, message: String },

    #[error("Shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("Scheduler error: {message}")]
    SchedulerError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CalendarError {
    pub fn source_unavailable(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn persistence(year: i32, message: impl ToString) -> Self {
        Self::PersistenceFailure {
            year,
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一來源失敗不影響整體同步
            CalendarError::SourceUnavailable { .. } => ErrorSeverity::Low,
            CalendarError::HttpError(_) | CalendarError::ShutdownTimeout(_) => {
                ErrorSeverity::Medium
            }
            CalendarError::ConfigError { .. }
            | CalendarError::InvalidConfigValueError { .. }
            | CalendarError::SerializationError(_)
            | CalendarError::SchedulerError { .. } => ErrorSeverity::High,
            CalendarError::PersistenceFailure { .. } | CalendarError::IoError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalendarError::SourceUnavailable { source_name, .. } => {
                format!("Calendar source '{}' could not be reached", source_name)
            }
            CalendarError::PersistenceFailure { year, .. } => {
                format!("Calendar for {} could not be saved", year)
            }
            CalendarError::ShutdownTimeout(_) => {
                "Background synchronization did not stop in time".to_string()
            }
            CalendarError::InvalidConfigValueError { field, .. } => {
                format!("Configuration problem with '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CalendarError::SourceUnavailable { .. } | CalendarError::HttpError(_) => {
                "Check network access to the source and retry the sync"
            }
            CalendarError::PersistenceFailure { .. } | CalendarError::IoError(_) => {
                "Check that the store directory exists and is writable"
            }
            CalendarError::ShutdownTimeout(_) => {
                "Increase schedule.shutdown_timeout_seconds or check slow sources"
            }
            CalendarError::ConfigError { .. }
            | CalendarError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line arguments"
            }
            CalendarError::SerializationError(_) => "Inspect the stored or received JSON data",
            CalendarError::SchedulerError { .. } => "Stop the scheduler before starting it again",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
