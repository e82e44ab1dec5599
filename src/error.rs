use crate::formula::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Invalid account type: {0}")]
    InvalidAccountType(String),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Duplicate row id: {0}")]
    DuplicateRowId(String),

    #[error("Cell not found at {address}")]
    CellNotFound { address: String },

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("{function}: {message}")]
    FormulaFunction { function: String, message: String },

    #[error("Render target {target} cannot translate formula functions: {}", functions.join(", "))]
    UnsupportedRenderTarget {
        target: String,
        functions: Vec<String>,
    },

    #[error("Circular reference detected at {address}")]
    CircularReference { address: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown formula function: {0}")]
    UnknownFunction(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Invalid audit data: {0}")]
    InvalidAuditData(String),

    #[error("{statement} does not tie out for {year}: {left} != {right}")]
    StatementImbalance {
        statement: String,
        year: String,
        left: f64,
        right: f64,
    },

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StatementError {
    pub(crate) fn function(function: &str, message: impl Into<String>) -> Self {
        StatementError::FormulaFunction {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatementError>;
