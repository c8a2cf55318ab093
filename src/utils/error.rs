use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Schema unavailable for table '{table}': {message}")]
    SchemaUnavailable { table: String, message: String },

    #[error("Schema mismatch for table '{table}': {message}")]
    SchemaMismatch { table: String, message: String },

    #[error("No importer matches report type '{report_type}'")]
    NoMatchingImporter { report_type: String },

    #[error("Validation error for table '{table}': missing required columns {missing:?}")]
    ValidationError { table: String, missing: Vec<String> },

    #[error("Insert into '{table}' failed: {message}")]
    InsertError { table: String, message: String },

    #[error("Secondary link warning: {message}")]
    SecondaryLinkWarning { message: String },

    #[error("Payload error in {source_name}: {message}")]
    PayloadError { source_name: String, message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Database API responded with status {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Schema,
    Dispatch,
    Database,
    Payload,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::SchemaUnavailable { .. } | ImportError::SchemaMismatch { .. } => {
                ErrorCategory::Schema
            }
            ImportError::NoMatchingImporter { .. } => ErrorCategory::Dispatch,
            ImportError::ValidationError { .. }
            | ImportError::InsertError { .. }
            | ImportError::SecondaryLinkWarning { .. }
            | ImportError::ApiError(_)
            | ImportError::ApiStatusError { .. } => ErrorCategory::Database,
            ImportError::PayloadError { .. } | ImportError::SerializationError(_) => {
                ErrorCategory::Payload
            }
            ImportError::ZipError(_) | ImportError::CsvError(_) | ImportError::IoError(_) => {
                ErrorCategory::Io
            }
            ImportError::ConfigError { .. }
            | ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ImportError::SecondaryLinkWarning { .. } => ErrorSeverity::Low,
            ImportError::ApiError(_) | ImportError::ApiStatusError { .. } => ErrorSeverity::Medium,
            ImportError::NoMatchingImporter { .. }
            | ImportError::PayloadError { .. }
            | ImportError::SerializationError(_)
            | ImportError::InsertError { .. }
            | ImportError::ValidationError { .. }
            | ImportError::SchemaMismatch { .. } => ErrorSeverity::High,
            ImportError::SchemaUnavailable { .. }
            | ImportError::ZipError(_)
            | ImportError::CsvError(_)
            | ImportError::IoError(_)
            | ImportError::ConfigError { .. }
            | ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 是否為終止本次匯入的錯誤
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ImportError::SecondaryLinkWarning { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::SchemaUnavailable { table, .. } => format!(
                "Could not read the column layout of '{}'. Is get_table_columns installed?",
                table
            ),
            ImportError::SchemaMismatch { table, .. } => format!(
                "Table '{}' has neither a data column nor the expected report columns",
                table
            ),
            ImportError::NoMatchingImporter { report_type } => {
                format!("Report type '{}' is not supported", report_type)
            }
            ImportError::ValidationError { table, missing } => format!(
                "Table '{}' is missing required columns: {}",
                table,
                missing.join(", ")
            ),
            ImportError::InsertError { table, .. } => {
                format!("The report could not be saved into '{}'", table)
            }
            ImportError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Schema => "Verify the target table exists and the introspection procedure is deployed",
            ErrorCategory::Dispatch => "Check the reportType of the exported payload",
            ErrorCategory::Database => "Check the database URL, API key and schema, then retry",
            ErrorCategory::Payload => "Re-export the report; the payload is not valid JSON",
            ErrorCategory::Io => "Check that the input files exist and the output path is writable",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_warning_is_not_terminal() {
        let warning = ImportError::SecondaryLinkWarning {
            message: "assets insert failed".to_string(),
        };
        assert!(!warning.is_terminal());
        assert_eq!(warning.severity(), ErrorSeverity::Low);

        let insert = ImportError::InsertError {
            table: "switch_reports".to_string(),
            message: "409".to_string(),
        };
        assert!(insert.is_terminal());
        assert_eq!(insert.category(), ErrorCategory::Database);
    }

    #[test]
    fn test_validation_message_lists_columns() {
        let err = ImportError::ValidationError {
            table: "panelboard_reports".to_string(),
            missing: vec!["job_id".to_string(), "user_id".to_string()],
        };
        assert!(err.user_friendly_message().contains("job_id, user_id"));
    }
}
