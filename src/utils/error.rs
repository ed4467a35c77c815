use thiserror::Error;

/// Failures of a single render call. Both variants are deterministic for a
/// given input, so retrying with the same metrics cannot succeed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(
        "cannot encode {field}: character {character:?} (U+{:04X}) at position {position} is outside the WinAnsi range",
        code_point(.character)
    )]
    Encoding {
        field: String,
        character: char,
        position: usize,
    },

    #[error("layout failed: {reason}")]
    Layout { reason: String },
}

fn code_point(character: &char) -> u32 {
    u32::from(*character)
}

impl RenderError {
    pub fn layout(reason: impl Into<String>) -> Self {
        RenderError::Layout {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Render error: {0}")]
    RenderError(#[from] RenderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::RenderError(RenderError::Encoding { .. }) => ErrorCategory::Input,
            ReportError::RenderError(RenderError::Layout { .. }) => ErrorCategory::Rendering,
            ReportError::SerializationError(_) => ErrorCategory::Input,
            ReportError::IoError(_) => ErrorCategory::System,
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReportError::RenderError(RenderError::Encoding {
                field, character, ..
            }) => format!(
                "The report cannot print {:?} found in {}; only Western (Windows-1252) characters are supported",
                character, field
            ),
            ReportError::RenderError(RenderError::Layout { reason }) => {
                format!("The report layout could not be completed: {}", reason)
            }
            ReportError::IoError(err) => format!("File access failed: {}", err),
            ReportError::SerializationError(err) => {
                format!("The metrics input is not valid JSON: {}", err)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::RenderError(RenderError::Encoding { .. }) => {
                "Transliterate or reject the offending name upstream before rendering"
            }
            ReportError::RenderError(RenderError::Layout { .. }) => {
                "Check that the layout rows fit inside the configured page area"
            }
            ReportError::IoError(_) => "Check that the paths exist and are writable",
            ReportError::SerializationError(_) => {
                "Check the metrics JSON against the expected field names"
            }
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. } => {
                "Review the command-line flags and layout TOML file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_error_names_the_code_point() {
        let err = RenderError::Encoding {
            field: "provider_breakdown[2].name".to_string(),
            character: '中',
            position: 4,
        };
        let message = err.to_string();
        assert!(message.contains("provider_breakdown[2].name"));
        assert!(message.contains("U+4E2D"));
        assert!(message.contains("position 4"));
    }

    #[test]
    fn severity_follows_category() {
        let encoding: ReportError = RenderError::Encoding {
            field: "clinic_name".to_string(),
            character: '\u{1F600}',
            position: 0,
        }
        .into();
        assert_eq!(encoding.category(), ErrorCategory::Input);
        assert_eq!(encoding.severity(), ErrorSeverity::Medium);

        let layout: ReportError = RenderError::layout("row too tall").into();
        assert_eq!(layout.severity(), ErrorSeverity::High);

        let io: ReportError = std::io::Error::other("disk gone").into();
        assert_eq!(io.severity(), ErrorSeverity::Critical);
    }
}
