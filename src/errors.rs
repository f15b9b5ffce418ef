// src/errors.rs
use serde::Serialize;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Optimization error: {0}")]
    Optimization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Data(_) => "DATA_ERROR",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Analysis(_) => "ANALYSIS_ERROR",
            CoreError::Optimization(_) => "OPTIMIZATION_ERROR",
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::Internal(_) => "GENERAL_ERROR",
        }
    }

    /// The detail message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            CoreError::Data(msg)
            | CoreError::Validation(msg)
            | CoreError::Analysis(msg)
            | CoreError::Optimization(msg)
            | CoreError::Config(msg)
            | CoreError::Internal(msg) => msg,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            CoreError::Data(_) => {
                "There was an issue with the data. Please check the data format and try again."
            }
            CoreError::Validation(_) => {
                "The input data failed validation. Please check the input format."
            }
            CoreError::Analysis(_) => {
                "An error occurred during analysis. Please try again with different parameters."
            }
            CoreError::Optimization(_) => {
                "An error occurred during strategy optimization. Please try with fewer parameters."
            }
            CoreError::Config(_) => "The service configuration could not be read.",
            CoreError::Internal(_) => "An unexpected error occurred. Please try again later.",
        }
    }

    pub fn suggested_fix(&self) -> &'static str {
        match self {
            CoreError::Data(_) => {
                "Try using a different data source or timeframe. Make sure the data includes all required OHLCV fields."
            }
            CoreError::Validation(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("missing") {
                    "Check that all required fields are included in your input."
                } else if lower.contains("invalid") {
                    "Check the data types and values of your input fields."
                } else {
                    "Verify that your input data meets all validation requirements."
                }
            }
            CoreError::Analysis(_) => {
                "Try using different technical indicators or parameters. Some indicators may not work well with the current data."
            }
            CoreError::Optimization(_) => {
                "Reduce the number of parameters to optimize or narrow the parameter ranges."
            }
            CoreError::Config(_) => "Check the STRATEGY_LAB_* environment variables.",
            CoreError::Internal(_) => "Please try again or report the issue.",
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Data(format!("I/O error: {}", e))
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Data(format!("CSV parsing error: {}", e))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Data(format!("JSON parsing error: {}", e))
    }
}

// --- Response envelope ---

#[derive(Serialize, Debug, Clone)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub description: String,
    pub suggestion: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl From<&CoreError> for ErrorResponse {
    fn from(e: &CoreError) -> Self {
        ErrorResponse {
            success: false,
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.message().to_string(),
                description: e.user_message().to_string(),
                suggestion: e.suggested_fix().to_string(),
            },
        }
    }
}
