use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Remote file not found: {path}")]
    RemoteFileNotFound { path: String },

    #[error("SFTP connection failed: {message}")]
    ConnectionError { message: String },

    #[error("Schema validation failed, missing columns: {}", .missing.join(", "))]
    SchemaValidationError { missing: Vec<String> },

    #[error("Cannot coerce '{value}' in column '{column}' (record {record})")]
    TypeCoercionError {
        column: String,
        value: String,
        record: usize,
    },

    #[error("Warehouse write failed: {message}")]
    WriteError { message: String },
}

/// How bad a failure is, from the scheduler's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Transient upstream condition, safe to retry on a later run.
    Medium,
    /// The input data is wrong; retrying the same file will fail again.
    High,
    /// Infrastructure problem: configuration, transport or destination.
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::RemoteFileNotFound { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_)
            | EtlError::SchemaValidationError { .. }
            | EtlError::TypeCoercionError { .. } => ErrorSeverity::High,
            EtlError::IoError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConnectionError { .. }
            | EtlError::WriteError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::RemoteFileNotFound { .. } => {
                "The upstream export has not landed yet; re-run once it is published"
            }
            EtlError::SchemaValidationError { .. } => {
                "Check the export format with the upstream team; the column set changed"
            }
            EtlError::TypeCoercionError { .. } | EtlError::CsvError(_) => {
                "Inspect the downloaded file; the content does not match the expected types"
            }
            EtlError::MissingConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Set the missing environment variables or CLI flags and try again"
            }
            EtlError::ConnectionError { .. } => {
                "Verify SFTP host, credentials and network reachability"
            }
            EtlError::WriteError { .. } => {
                "Verify BigQuery credentials, project id and destination table"
            }
            EtlError::IoError(_) | EtlError::SerializationError(_) => {
                "Check local disk access for the spool directory"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
