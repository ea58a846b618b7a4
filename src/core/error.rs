use thiserror::Error;

/// Errors that can occur while importing, validating or encoding invoices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A source column or attribute is missing or unparsable.
    #[error("parse error: {0}")]
    Parse(String),

    /// The invoice is structurally ineligible for TRAF2000 output.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The document uses a feature this encoder does not handle
    /// (credit notes, unknown input formats).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A value does not fit the fixed-width field it is written to.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A record layout or encoder configuration is inconsistent.
    #[error("layout error: {0}")]
    Layout(String),

    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// CSV reader error.
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Opening, reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation error, tied to the invoice it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{invoice}: {field}: {message}")]
pub struct ValidationError {
    /// Invoice number the error belongs to.
    pub invoice: String,
    /// Name of the invalid field (e.g. "tax_id").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl ValidationError {
    pub fn new(
        invoice: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            invoice: invoice.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new("CCSR/00001", "tax_id", "must be 16 or 11 characters");
        assert_eq!(
            err.to_string(),
            "CCSR/00001: tax_id: must be 16 or 11 characters"
        );
    }

    #[test]
    fn validation_error_converts() {
        let err: ConvertError = ValidationError::new("X", "kind", "bad").into();
        assert!(matches!(err, ConvertError::Validation(_)));
        assert_eq!(err.to_string(), "validation failed: X: kind: bad");
    }
}
