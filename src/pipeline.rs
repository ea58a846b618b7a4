//! One conversion run: import, triage, encode, write.
//!
//! All invoices are encoded before the output is opened, so a run that
//! fails leaves no partial TRAF2000 file behind. Per-invoice problems never
//! fail the run; they end up in the [`RunReport`].

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::{ConvertError, Event, EventSink, Invoice, ValidationError, triage};
use crate::import::{ImportOptions, Imported, InputFormat, import_path, import_reader};
use crate::traf2000::{
    EncodedInvoice, Encoder, EncoderConfig, write_traf2000, write_traf2000_file,
};

/// Importer and encoder settings, as loaded from a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub import: ImportOptions,
    pub encoder: EncoderConfig,
}

/// What happened to one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the TRAF2000 file.
    Encoded,
    /// Listed in the credit-note report instead.
    CreditNote,
    /// Failed validation.
    Rejected(Vec<ValidationError>),
    /// Could not be assembled from the source.
    ImportFailed(String),
    /// Passed validation but could not be encoded.
    EncodeFailed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoded => f.write_str("encoded"),
            Self::CreditNote => f.write_str("credit note, not converted"),
            Self::Rejected(errors) => {
                f.write_str("rejected:")?;
                for e in errors {
                    write!(f, " {}: {};", e.field, e.message)?;
                }
                Ok(())
            }
            Self::ImportFailed(reason) => write!(f, "import failed: {reason}"),
            Self::EncodeFailed(reason) => write!(f, "encoding failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceOutcome {
    /// Invoice number, `None` for rows whose number could not be read.
    pub invoice: Option<String>,
    pub outcome: Outcome,
}

/// Summary of a run, one entry per invoice in import order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<InvoiceOutcome>,
    /// Credit notes left out of the output, in import order.
    pub credit_notes: Vec<Invoice>,
    /// Invoices written to the output.
    pub written: usize,
}

impl RunReport {
    pub fn encoded(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Encoded)
            .filter_map(|o| o.invoice.as_deref())
    }

    /// Everything that was neither encoded nor diverted as a credit note.
    pub fn skipped(&self) -> impl Iterator<Item = &InvoiceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.outcome, Outcome::Encoded | Outcome::CreditNote))
    }
}

/// Invoices encoded in memory, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub encoded: Vec<EncodedInvoice>,
    pub report: RunReport,
}

/// Runs conversions with one set of settings.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ImportOptions,
    encoder: Encoder,
}

impl Converter {
    pub fn new(settings: Settings) -> Result<Self, ConvertError> {
        Ok(Self {
            options: settings.import,
            encoder: Encoder::new(settings.encoder)?,
        })
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Triage and encode imported invoices. Nothing is written.
    pub fn convert(&self, imported: Imported, sink: &mut dyn EventSink) -> Conversion {
        let mut order: IndexSet<String> = imported.encounter_order;
        order.extend(imported.invoices.keys().cloned());
        let mut outcomes: Vec<InvoiceOutcome> = imported
            .failures
            .into_iter()
            .map(|f| InvoiceOutcome {
                invoice: f.invoice,
                outcome: Outcome::ImportFailed(f.error.to_string()),
            })
            .collect();

        let routed = triage(imported.invoices, sink);
        for rejected in routed.rejected {
            outcomes.push(InvoiceOutcome {
                invoice: Some(rejected.invoice.number),
                outcome: Outcome::Rejected(rejected.errors),
            });
        }
        for note in &routed.credit_notes {
            outcomes.push(InvoiceOutcome {
                invoice: Some(note.number.clone()),
                outcome: Outcome::CreditNote,
            });
        }

        let mut encoded = Vec::with_capacity(routed.accepted.len());
        for invoice in &routed.accepted {
            let outcome = match self.encoder.encode_with(invoice, sink) {
                Ok(e) => {
                    sink.emit(Event::info("invoice converted").invoice(&invoice.number));
                    encoded.push(e);
                    Outcome::Encoded
                }
                Err(e) => {
                    sink.emit(Event::error(e.to_string()).invoice(&invoice.number));
                    Outcome::EncodeFailed(e.to_string())
                }
            };
            outcomes.push(InvoiceOutcome {
                invoice: Some(invoice.number.clone()),
                outcome,
            });
        }

        // Import failures without a number first, then import order.
        outcomes.sort_by_key(|o| o.invoice.as_ref().map(|n| order.get_index_of(n).unwrap_or(usize::MAX)));

        Conversion {
            encoded,
            report: RunReport {
                outcomes,
                credit_notes: routed.credit_notes,
                written: 0,
            },
        }
    }

    /// Convert `reader` and stream the blocks to `out`.
    pub fn convert_reader<R: Read, W: Write>(
        &self,
        format: InputFormat,
        reader: R,
        out: &mut W,
        sink: &mut dyn EventSink,
    ) -> Result<RunReport, ConvertError> {
        let imported = import_reader(format, reader, &self.options, sink)?;
        let Conversion { encoded, mut report } = self.convert(imported, sink);
        report.written = write_traf2000(out, &encoded, self.encoder.config().line_ending)?;
        finished(&report, sink);
        Ok(report)
    }

    /// Convert the file at `input` into a TRAF2000 file at `output`.
    ///
    /// `output` is created only after every invoice has been encoded.
    pub fn convert_file(
        &self,
        input: &Path,
        output: &Path,
        sink: &mut dyn EventSink,
    ) -> Result<RunReport, ConvertError> {
        let imported = import_path(input, &self.options, sink)?;
        let Conversion { encoded, mut report } = self.convert(imported, sink);
        report.written = write_traf2000_file(output, &encoded, self.encoder.config().line_ending)?;
        sink.emit(Event::info(format!("TRAF2000 file saved to {}", output.display())));
        finished(&report, sink);
        Ok(report)
    }
}

fn finished(report: &RunReport, sink: &mut dyn EventSink) {
    sink.emit(Event::info(format!(
        "conversion finished: {} written, {} credit notes, {} skipped",
        report.written,
        report.credit_notes.len(),
        report.skipped().count()
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DocumentKind, InvoiceBuilder, MemorySink};
    use crate::import::ImportFailure;
    use chrono::NaiveDate;
    use indexmap::IndexMap;

    fn invoice(number: &str, kind: DocumentKind, tax_id: &str) -> Invoice {
        InvoiceBuilder::new(number, kind, NaiveDate::from_ymd_opt(2020, 1, 31).unwrap())
            .customer("ROSSI", "MARIO")
            .tax_id(tax_id)
            .add_line("Visita", 10000)
            .build()
            .unwrap()
    }

    #[test]
    fn outcomes_follow_import_order() {
        let mut invoices = IndexMap::new();
        for inv in [
            invoice("CCSR/00001", DocumentKind::CreditNote, "01234567890"),
            invoice("CCSR/00003", DocumentKind::Invoice, "123"),
            invoice("CCSR/00004", DocumentKind::Invoice, "01234567890"),
        ] {
            invoices.insert(inv.number.clone(), inv);
        }
        let imported = Imported {
            invoices,
            failures: vec![
                ImportFailure {
                    invoice: Some("CCSR/00002".into()),
                    error: ConvertError::Parse("row 6: invalid amount 'n.d.'".into()),
                },
                ImportFailure {
                    invoice: None,
                    error: ConvertError::Parse("row 9: empty invoice number".into()),
                },
            ],
            encounter_order: ["CCSR/00001", "CCSR/00002", "CCSR/00003", "CCSR/00004"]
                .into_iter()
                .map(String::from)
                .collect(),
        };

        let converter = Converter::new(Settings::default()).unwrap();
        let conversion = converter.convert(imported, &mut MemorySink::new());

        let numbers: Vec<_> = conversion
            .report
            .outcomes
            .iter()
            .map(|o| o.invoice.as_deref())
            .collect();
        assert_eq!(
            numbers,
            [
                None,
                Some("CCSR/00001"),
                Some("CCSR/00002"),
                Some("CCSR/00003"),
                Some("CCSR/00004")
            ]
        );
        assert_eq!(conversion.encoded.len(), 1);
        assert_eq!(conversion.report.credit_notes.len(), 1);
        assert_eq!(conversion.report.skipped().count(), 3);
    }

    #[test]
    fn outcome_display() {
        let rejected = Outcome::Rejected(vec![ValidationError::new("1", "tax_id", "too short")]);
        assert_eq!(rejected.to_string(), "rejected: tax_id: too short;");
        assert_eq!(Outcome::CreditNote.to_string(), "credit note, not converted");
    }
}
