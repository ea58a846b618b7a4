//! Output of encoded invoices and of the credit-note report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rust_decimal::Decimal;

use super::config::LineEnding;
use super::encoder::EncodedInvoice;
use crate::core::{ConvertError, Invoice};

/// Write every block in order. Returns the number of invoices written.
pub fn write_traf2000<W: Write>(
    out: &mut W,
    invoices: &[EncodedInvoice],
    line_ending: LineEnding,
) -> Result<usize, ConvertError> {
    for invoice in invoices {
        invoice.write_to(out, line_ending)?;
    }
    Ok(invoices.len())
}

/// Create (or truncate) `path` and write every block to it.
pub fn write_traf2000_file(
    path: &Path,
    invoices: &[EncodedInvoice],
    line_ending: LineEnding,
) -> Result<usize, ConvertError> {
    let mut out = BufWriter::new(File::create(path)?);
    let written = write_traf2000(&mut out, invoices, line_ending)?;
    out.flush()?;
    Ok(written)
}

/// Plain-text list of the credit notes left out of the TRAF2000 file.
pub fn write_credit_note_report<W: Write>(
    out: &mut W,
    credit_notes: &[Invoice],
) -> Result<(), ConvertError> {
    writeln!(out, "Note di credito:")?;
    for note in credit_notes {
        writeln!(
            out,
            "{} del {} - {} - {}",
            note.number,
            note.date.format("%d/%m/%Y"),
            note.customer_name,
            Decimal::new(note.total_amount, 2)
        )?;
    }
    Ok(())
}
