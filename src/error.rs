use teloxide::RequestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetBotError {
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Telegram API error: {0}")]
    Telegram(#[from] RequestError),

    #[error("Invalid message format: {message}")]
    Format { message: String },

    #[error("Invalid amount: {message}")]
    Amount { message: String },

    #[error("Dispatcher reached an unknown conversation state")]
    UnknownState,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, BudgetBotError>;

impl BudgetBotError {
    pub fn format_error(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn amount_error(message: impl Into<String>) -> Self {
        Self::Amount {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Text shown to the chat. Parse errors are shown verbatim; everything
    /// else collapses to a generic failure so internals never leak.
    pub fn user_message(&self) -> &str {
        match self {
            BudgetBotError::Format { message } | BudgetBotError::Amount { message } => message,
            _ => "❌ Произошла ошибка, попробуйте позже",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BudgetBotError::Store(_)
                | BudgetBotError::StoreUnavailable { .. }
                | BudgetBotError::Telegram(_)
                | BudgetBotError::Io(_)
        )
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BudgetBotError::Config { .. } => ErrorSeverity::Critical,
            BudgetBotError::Store(_) => ErrorSeverity::High,
            BudgetBotError::StoreUnavailable { .. } => ErrorSeverity::High,
            BudgetBotError::Telegram(_) => ErrorSeverity::Medium,
            BudgetBotError::Format { .. } => ErrorSeverity::Low,
            BudgetBotError::Amount { .. } => ErrorSeverity::Low,
            BudgetBotError::UnknownState => ErrorSeverity::Low,
            BudgetBotError::Io(_) => ErrorSeverity::Medium,
            BudgetBotError::Env(_) => ErrorSeverity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
