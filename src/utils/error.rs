use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to load deck from {}: {reason}", .path.display())]
    LoadError { path: PathBuf, reason: String },

    #[error("Card not found: {name}")]
    NotFoundError { name: String },

    #[error("The deck is empty")]
    EmptyDeckError,

    #[error("Failed to persist {}: {source}", .path.display())]
    PersistError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Card name '{name}' matches {count} cards in the deck")]
    AmbiguousCardError { name: String, count: usize },

    #[error("Cannot {action} while the session is {state}")]
    InvalidStateError { action: String, state: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Deck,
    Session,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DeckError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::LoadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistError {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFoundError { name: name.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::LoadError { .. }
            | Self::PersistError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorCategory::Storage,
            Self::NotFoundError { .. } | Self::EmptyDeckError | Self::AmbiguousCardError { .. } => {
                ErrorCategory::Deck
            }
            Self::InvalidStateError { .. } => ErrorCategory::Session,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者可以直接重試或換一張牌
            Self::NotFoundError { .. }
            | Self::EmptyDeckError
            | Self::AmbiguousCardError { .. }
            | Self::InvalidStateError { .. } => ErrorSeverity::Low,
            Self::PersistError { .. } => ErrorSeverity::Medium,
            Self::LoadError { .. } | Self::SerializationError(_) => ErrorSeverity::High,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } | Self::IoError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// 只有配置問題會中止程式，其餘錯誤回報後 session 繼續
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::LoadError { path, .. } => {
                format!("Failed to load deck: {}", path.display())
            }
            Self::NotFoundError { name } => format!("There is no card named '{}' in the deck", name),
            Self::EmptyDeckError => "No cards left in the deck!".to_string(),
            Self::PersistError { path, .. } => {
                format!("Could not save deck state to {}", path.display())
            }
            Self::AmbiguousCardError { name, count } => {
                format!("{} cards are named '{}'; pick one by position instead", count, name)
            }
            Self::InvalidStateError { action, .. } => format!("You can't {} right now", action),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(e) => format!("Deck data could not be processed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::LoadError { .. } => {
                "Check that the file exists and contains a \"MajorArcana\" list, or load a different deck"
            }
            Self::NotFoundError { .. } => "Run `status` to list the cards still in the deck",
            Self::EmptyDeckError => "Start a new deck or finish the session",
            Self::PersistError { .. } => {
                "Check free disk space and write permissions, then repeat the action"
            }
            Self::AmbiguousCardError { .. } => "Draw by position from the spread",
            Self::InvalidStateError { .. } => "Follow the menu: load, shuffle, then draw",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            Self::IoError(_) => "Check file permissions and paths",
            Self::SerializationError(_) => "Make sure the deck file is valid JSON",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(DeckError::EmptyDeckError => ErrorSeverity::Low ; "empty deck")]
    #[test_case(DeckError::not_found("The Void") => ErrorSeverity::Low ; "missing card")]
    #[test_case(DeckError::load("missing.json", "not found") => ErrorSeverity::High ; "load failure")]
    #[test_case(DeckError::ConfigError { message: "bad".into() } => ErrorSeverity::Critical ; "bad config")]
    fn test_severity(err: DeckError) -> ErrorSeverity {
        err.severity()
    }

    #[test]
    fn test_persist_error_is_recoverable() {
        let err = DeckError::persist(
            "workingDeck.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        );
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(!err.is_fatal());
        assert!(err.user_friendly_message().contains("workingDeck.json"));
    }

    #[test]
    fn test_display_includes_card_name() {
        let err = DeckError::not_found("The Fool");
        assert_eq!(err.to_string(), "Card not found: The Fool");
    }
}
