//! Importers for billing-platform exports.
//!
//! Both entry points produce the same shape: an insertion-ordered map of
//! invoice number → [`Invoice`], plus the invoices that could not be
//! assembled. A malformed row or element only drops the invoice it belongs
//! to; a document that cannot be read at all fails the whole import.
//!
//! # Example
//!
//! ```ignore
//! use traf2000::import::*;
//!
//! let imported = import_path("fatturato.xml".as_ref(), &ImportOptions::default(), &mut sink)?;
//! for (number, invoice) in &imported.invoices {
//!     println!("{number}: {}", invoice.total_amount);
//! }
//! ```

pub mod amount;
#[cfg(feature = "csv")]
mod csv;
#[cfg(feature = "xml")]
mod schema;
#[cfg(feature = "xml")]
mod xml;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::core::{ConvertError, DocumentKind, EventSink, Invoice, WITHHOLDING_TAX_LABEL};

#[cfg(feature = "csv")]
pub use self::csv::import_csv;
#[cfg(feature = "xml")]
pub use schema::{SchemaViolation, validate_schema};
#[cfg(feature = "xml")]
pub use self::xml::import_xml;

/// How the XML importer treats schema violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchemaCheck {
    /// Do not check.
    Skip,
    /// Check and report every violation as a warning, then import anyway.
    #[default]
    Report,
    /// Check and fail the whole import on the first violation.
    Enforce,
}

/// Options shared by both importers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Header rows skipped at the top of a CSV export.
    pub csv_header_rows: usize,
    /// Line description that carries the withholding tax.
    pub withholding_label: String,
    /// Line description of the stamp duty.
    pub stamp_duty_label: String,
    /// Schema check applied to XML documents.
    pub schema_check: SchemaCheck,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            csv_header_rows: 4,
            withholding_label: WITHHOLDING_TAX_LABEL.into(),
            stamp_duty_label: crate::core::STAMP_DUTY_LABEL.into(),
            schema_check: SchemaCheck::Report,
        }
    }
}

impl ImportOptions {
    pub fn builder() -> ImportOptionsBuilder {
        ImportOptionsBuilder::default()
    }
}

/// Builder for [`ImportOptions`].
#[derive(Debug, Default)]
pub struct ImportOptionsBuilder {
    options: ImportOptions,
}

impl ImportOptionsBuilder {
    pub fn csv_header_rows(mut self, rows: usize) -> Self {
        self.options.csv_header_rows = rows;
        self
    }

    pub fn withholding_label(mut self, label: impl Into<String>) -> Self {
        self.options.withholding_label = label.into();
        self
    }

    pub fn stamp_duty_label(mut self, label: impl Into<String>) -> Self {
        self.options.stamp_duty_label = label.into();
        self
    }

    pub fn schema_check(mut self, check: SchemaCheck) -> Self {
        self.options.schema_check = check;
        self
    }

    pub fn build(self) -> ImportOptions {
        self.options
    }
}

/// An invoice dropped during import.
#[derive(Debug)]
pub struct ImportFailure {
    /// Invoice number, when it could be read.
    pub invoice: Option<String>,
    pub error: ConvertError,
}

/// Result of an import.
#[derive(Debug, Default)]
pub struct Imported {
    /// Invoices in encounter order.
    pub invoices: IndexMap<String, Invoice>,
    /// Invoices that could not be assembled, in encounter order.
    pub failures: Vec<ImportFailure>,
    /// Every invoice number read, imported or failed, in first-encounter
    /// order.
    pub encounter_order: IndexSet<String>,
}

/// Source format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    Csv,
    Xml,
}

impl InputFormat {
    /// Detect the format from the file extension (`.csv` or `.xml`).
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                ConvertError::Unsupported(format!("{} has no file extension", path.display()))
            })?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            other => Err(ConvertError::Unsupported(format!(
                "expected .csv or .xml but received .{other}"
            ))),
        }
    }
}

/// Import from any reader in the given format.
pub fn import_reader<R: Read>(
    format: InputFormat,
    reader: R,
    options: &ImportOptions,
    sink: &mut dyn EventSink,
) -> Result<Imported, ConvertError> {
    match format {
        #[cfg(feature = "csv")]
        InputFormat::Csv => import_csv(reader, options, sink),
        #[cfg(feature = "xml")]
        InputFormat::Xml => {
            let mut text = String::new();
            let mut reader = reader;
            reader.read_to_string(&mut text)?;
            import_xml(&text, options, sink)
        }
        #[allow(unreachable_patterns)]
        other => Err(ConvertError::Unsupported(format!(
            "{other:?} import is not enabled in this build"
        ))),
    }
}

/// Open `path`, detect its format from the extension and import it.
pub fn import_path(
    path: &Path,
    options: &ImportOptions,
    sink: &mut dyn EventSink,
) -> Result<Imported, ConvertError> {
    let format = InputFormat::from_path(path)?;
    let file = File::open(path)?;
    import_reader(format, BufReader::new(file), options, sink)
}

/// Sign rule for credit-note lines.
///
/// The source shows credit-note amounts either as plain positive numbers,
/// which must be negated, or with a marker meaning "already negative",
/// which leaves the parsed value untouched.
pub(crate) fn credit_note_sign(kind: &DocumentKind, already_negative: bool) -> i64 {
    if *kind == DocumentKind::CreditNote && !already_negative {
        -1
    } else {
        1
    }
}
