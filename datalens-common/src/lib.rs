pub mod config;
pub use config::{Config, ExportConfig, LoaderConfig, LoggingConfig, ProfilingConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatalensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// input format not recognized by the loader
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    /// column values violate the column's declared kind or the table shape
    #[error("invalid data in column `{column}`: {reason}")]
    DataValidation { column: String, reason: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

impl DatalensError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { name, reason: reason.into() }
    }

    pub fn data_validation(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataValidation { column: column.into(), reason: reason.into() }
    }

    /// true for conditions the user caused and can fix, as opposed to IO/decoding faults
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::InvalidArgument { .. } | Self::DataValidation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DatalensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_validation_names_column() {
        let e = DatalensError::data_validation("age", "value at row 3 is NaN");
        assert_eq!(e.to_string(), "invalid data in column `age`: value at row 3 is NaN");
        assert!(e.is_user_facing());
    }

    #[test]
    fn io_is_not_user_facing() {
        let e: DatalensError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(!e.is_user_facing());
    }
}
