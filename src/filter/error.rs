use thiserror::Error;

/// Caller-input errors raised before any SQL reaches the database.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No data")]
    NoData,

    #[error("min value can not be larger than max ({column}: {lower} > {upper})")]
    InvertedRange {
        column: String,
        lower: String,
        upper: String,
    },

    #[error("Duplicate {0}")]
    Duplicate(String),
}

impl ValidationError {
    pub fn duplicate(what: impl Into<String>) -> Self {
        ValidationError::Duplicate(what.into())
    }
}
