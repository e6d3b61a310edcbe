//! Errors surfaced by a generation.

use std::fmt;

pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format: missing flashcards array";

/// Tag callers branch on instead of matching the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AiService,
    Validation,
    Persistence,
    Unknown,
}

impl ErrorKind {
    /// Value written to the `error_code` column of an error record.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AiService => "AiServiceError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Persistence => "PersistenceError",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The AI client reported a failure of its own.
    #[error("AI Service error: {message}{}", code_suffix(.code))]
    AiService {
        message: String,
        code: Option<String>,
    },

    /// The AI client failed in a way it could not describe.
    #[error("AI Service error: {0:#}")]
    Upstream(anyhow::Error),

    #[error("Invalid response format: missing flashcards array")]
    InvalidResponse,

    #[error("{0:#}")]
    Persistence(anyhow::Error),
}

fn code_suffix(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::AiService { .. } => ErrorKind::AiService,
            GenerationError::Upstream(_) => ErrorKind::Unknown,
            GenerationError::InvalidResponse => ErrorKind::Validation,
            GenerationError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn error_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Upstream code attached by the AI client, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            GenerationError::AiService { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn ai_service_message_includes_code_when_present() {
        let err = GenerationError::AiService {
            message: "Invalid API key".to_string(),
            code: Some("401".to_string()),
        };
        assert_eq!(err.to_string(), "AI Service error: Invalid API key (401)");
        assert_eq!(err.code(), Some("401"));
        assert_eq!(err.error_code(), "AiServiceError");

        let err = GenerationError::AiService {
            message: "overloaded".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "AI Service error: overloaded");
    }

    #[test]
    fn invalid_response_message_is_fixed() {
        let err = GenerationError::InvalidResponse;
        assert_eq!(
            err.to_string(),
            "Invalid response format: missing flashcards array"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn opaque_errors_are_unknown() {
        let err = GenerationError::Upstream(anyhow!("AI service failed"));
        assert_eq!(err.to_string(), "AI Service error: AI service failed");
        assert_eq!(err.error_code(), "UNKNOWN");
    }

    #[test]
    fn persistence_errors_keep_their_message() {
        let err = GenerationError::Persistence(anyhow!("Database connection lost"));
        assert_eq!(err.to_string(), "Database connection lost");
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
