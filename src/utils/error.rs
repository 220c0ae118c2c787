use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobPatternError(#[from] glob::PatternError),

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

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Local file not found: {path}")]
    LocalFileNotFound { path: String },

    #[error("{step} failed (`{command}`, exit code {code:?}): {stderr}")]
    CommandFailed {
        step: String,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Container '{container}' is not running")]
    ContainerNotRunning { container: String },

    #[error("HDFS not accessible: {message}")]
    HdfsUnreachable { message: String },

    #[error("HDFS connectivity probe timed out after {seconds}s")]
    ProbeTimeout { seconds: u64 },

    #[error("WebHDFS request failed ({status}): {exception}: {message}")]
    WebHdfsError {
        status: u16,
        exception: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Data,
    Command,
    Connectivity,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::GlobPatternError(_) => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::LocalFileNotFound { .. } => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::CommandFailed { .. } => ErrorCategory::Command,
            EtlError::ContainerNotRunning { .. }
            | EtlError::HdfsUnreachable { .. }
            | EtlError::ProbeTimeout { .. }
            | EtlError::ApiError(_) => ErrorCategory::Connectivity,
            EtlError::WebHdfsError { .. } => ErrorCategory::Remote,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Io | ErrorCategory::Command | ErrorCategory::Remote => {
                ErrorSeverity::High
            }
            ErrorCategory::Connectivity => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ContainerNotRunning { .. } => {
                "Start the HDFS containers with: docker-compose up -d".to_string()
            }
            EtlError::HdfsUnreachable { .. } | EtlError::ProbeTimeout { .. } => {
                "Check the namenode logs (docker logs namenode) and wait until it leaves safe mode"
                    .to_string()
            }
            EtlError::LocalFileNotFound { .. } => {
                "Run lastfm-etl first to export the CSV, or pass --local-file".to_string()
            }
            EtlError::CommandFailed { .. } => {
                "Re-run with --verbose to see the exact command and its output".to_string()
            }
            EtlError::ApiError(_) => {
                "Make sure the namenode web port (9870) is published and reachable".to_string()
            }
            EtlError::WebHdfsError { .. } => {
                "Check HDFS permissions for the configured user and that the path is valid"
                    .to_string()
            }
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::GlobPatternError(_) => {
                "Fix the configuration file or command-line flags and try again".to_string()
            }
            EtlError::IoError(_) => "Check file paths and permissions".to_string(),
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => {
                "Inspect the input data for malformed records".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ContainerNotRunning { container } => {
                format!("{} container not running", container)
            }
            EtlError::HdfsUnreachable { message } => format!("HDFS not accessible: {}", message),
            EtlError::CommandFailed { step, stderr, .. } => format!("{}: {}", step, stderr),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
