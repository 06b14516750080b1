use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("{0}")] Validation(String),
    #[error("AI generation failed: {0}")] AiGenerationFailed(String),
    #[error("could not read {source_name}: {reason}")] Ingestion { source_name: String, reason: String },
    #[error("another operation is still running")] Busy,
    #[error("configuration error: {0}")] Config(String),
}

impl FlowError {
    /// Message shown to the end user. Falls back to a generic text when the
    /// service handed us nothing to show.
    pub fn user_message(&self) -> String {
        let inner_empty = match self {
            FlowError::Validation(m) | FlowError::AiGenerationFailed(m) | FlowError::Config(m) => {
                m.trim().is_empty()
            }
            FlowError::Ingestion { reason, .. } => reason.trim().is_empty(),
            FlowError::Busy => false,
        };
        if inner_empty {
            FALLBACK_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_uses_service_text() {
        let e = FlowError::AiGenerationFailed("quota exceeded".into());
        assert_eq!(e.user_message(), "AI generation failed: quota exceeded");
    }

    #[test]
    fn user_message_falls_back_when_empty() {
        assert_eq!(FlowError::AiGenerationFailed("  ".into()).user_message(), FALLBACK_MESSAGE);
        assert_eq!(FlowError::Validation(String::new()).user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn ingestion_names_the_source() {
        let e = FlowError::Ingestion { source_name: "Main.java".into(), reason: "not UTF-8".into() };
        assert_eq!(e.to_string(), "could not read Main.java: not UTF-8");
    }
}
