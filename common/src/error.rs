//! Argument validation errors.

use thiserror::Error;

/// An argument was rejected before any I/O took place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Currency code was empty or blank.
    #[error("{field} currency is required")]
    MissingCurrency { field: &'static str },

    /// Currency code contained something other than ASCII letters.
    #[error("Invalid {field} currency code: {code:?}")]
    InvalidCurrency { field: &'static str, code: String },

    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(String),

    /// Start date is after end date.
    #[error("Start date {start} must not be after end date {end}")]
    InvalidDateRange { start: String, end: String },

    /// Page or page size below one.
    #[error("Page and page size must be greater than zero (page={page}, page_size={page_size})")]
    InvalidPagination { page: u32, page_size: u32 },

    /// Converted amount does not fit in a decimal.
    #[error("Converting {amount} at rate {rate} overflows")]
    AmountOutOfRange { amount: String, rate: String },

    /// Currency is on the caller's exclusion list.
    #[error("Currency conversion involving {0} is not allowed")]
    ExcludedCurrency(String),
}

impl ValidationError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::MissingCurrency { .. } => "MISSING_CURRENCY",
            ValidationError::InvalidCurrency { .. } => "INVALID_CURRENCY",
            ValidationError::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            ValidationError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            ValidationError::InvalidPagination { .. } => "INVALID_PAGINATION",
            ValidationError::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            ValidationError::ExcludedCurrency(_) => "EXCLUDED_CURRENCY",
        }
    }
}

/// Result type alias for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
