use std::io::{self, Write};

use super::config::{EncoderConfig, LineEnding};
use super::layout::RecordLayout;
use super::record0::{self, RECORD_0};
use super::record1::{self, RECORD_1};
use super::record5::{self, RECORD_5};
use crate::core::{ConvertError, Event, EventSink, Invoice, TaxId, ValidationError};

/// The three records of one invoice, in output order 0, 5, 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInvoice {
    pub number: String,
    records: [String; 3],
}

impl EncodedInvoice {
    pub fn records(&self) -> &[String; 3] {
        &self.records
    }

    pub fn record0(&self) -> &str {
        &self.records[0]
    }

    pub fn record5(&self) -> &str {
        &self.records[1]
    }

    pub fn record1(&self) -> &str {
        &self.records[2]
    }

    /// The block as written to the output file.
    pub fn to_block(&self, line_ending: LineEnding) -> String {
        let eol = line_ending.as_str();
        let mut out = String::with_capacity(self.records.iter().map(|r| r.len() + eol.len()).sum());
        for record in &self.records {
            out.push_str(record);
            out.push_str(eol);
        }
        out
    }

    pub fn write_to<W: Write>(&self, out: &mut W, line_ending: LineEnding) -> io::Result<()> {
        for record in &self.records {
            out.write_all(record.as_bytes())?;
            out.write_all(line_ending.as_str().as_bytes())?;
        }
        Ok(())
    }
}

/// TRAF2000 encoder.
///
/// Layouts are compiled and checked once, when the encoder is built; an
/// encoder that exists can only produce records of the declared width.
///
/// # Example
///
/// ```
/// use traf2000::core::*;
/// use traf2000::traf2000::{Encoder, EncoderConfig};
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("CCSR/00123", DocumentKind::Invoice, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .customer("ROSSI", "MARIO")
///     .tax_id("RSSMRA80A01G702X")
///     .add_line("Visita", 10000)
///     .build()
///     .unwrap();
///
/// let encoder = Encoder::new(EncoderConfig::default()).unwrap();
/// let encoded = encoder.encode(&invoice).unwrap();
/// assert!(encoded.records().iter().all(|r| r.len() == 7001));
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
    record0: RecordLayout,
    record5: RecordLayout,
    record1: RecordLayout,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self {
            config,
            record0: RecordLayout::compile(&RECORD_0)?,
            record5: RecordLayout::compile(&RECORD_5)?,
            record1: RecordLayout::compile(&RECORD_1)?,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode one invoice.
    ///
    /// Credit notes are refused with [`ConvertError::Unsupported`]; a
    /// missing number, customer name or tax id is a validation error.
    pub fn encode(&self, invoice: &Invoice) -> Result<EncodedInvoice, ConvertError> {
        self.encode_with(invoice, &mut ())
    }

    /// Like [`encode`](Self::encode), reporting each record to `sink`.
    pub fn encode_with(
        &self,
        invoice: &Invoice,
        sink: &mut dyn EventSink,
    ) -> Result<EncodedInvoice, ConvertError> {
        if invoice.is_credit_note() {
            return Err(ConvertError::Unsupported(format!(
                "credit note {} cannot be encoded",
                invoice.number
            )));
        }
        self.render(invoice, sink)
    }

    fn render(&self, invoice: &Invoice, sink: &mut dyn EventSink) -> Result<EncodedInvoice, ConvertError> {
        let tax_id = required_fields(invoice)?;

        let mut r0 = self.record0.new_record();
        record0::fill(&mut r0, invoice, &tax_id, &self.config)?;
        sink.emit(Event::debug("record 0 created").invoice(&invoice.number));

        let mut r5 = self.record5.new_record();
        record5::fill(&mut r5, invoice, &tax_id, &self.config)?;
        sink.emit(Event::debug("record 5 created").invoice(&invoice.number));

        let mut r1 = self.record1.new_record();
        record1::fill(&mut r1, invoice, &self.config)?;
        sink.emit(Event::debug("record 1 created").invoice(&invoice.number));

        Ok(EncodedInvoice {
            number: invoice.number.clone(),
            records: [r0.into_string(), r5.into_string(), r1.into_string()],
        })
    }
}

fn required_fields(invoice: &Invoice) -> Result<TaxId, ConvertError> {
    let missing = |field: &str| ValidationError::new(&invoice.number, field, "missing");
    if invoice.number.trim().is_empty() {
        return Err(missing("number").into());
    }
    if invoice.customer_name.trim().is_empty() {
        return Err(missing("customer_name").into());
    }
    if invoice.tax_id.trim().is_empty() {
        return Err(missing("tax_id").into());
    }
    TaxId::classify(&invoice.tax_id).ok_or_else(|| {
        ValidationError::new(&invoice.number, "tax_id", "must be 16 or 11 characters").into()
    })
}
