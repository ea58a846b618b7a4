//! CSV export importer.
//!
//! The report starts with a fixed block of header rows and ends at the
//! first empty row; everything after that (totals, footers) is ignored.
//! One row per invoice line, invoice header columns repeated on every row.

use std::collections::HashSet;
use std::io::Read;

use ::csv::{ReaderBuilder, StringRecord};
use indexmap::{IndexMap, IndexSet};

use super::amount::{has_parenthesis, parse_csv_cents, parse_csv_date};
use super::{ImportFailure, ImportOptions, Imported, credit_note_sign};
use crate::core::{ConvertError, DocumentKind, Event, EventSink, InvoiceBuilder};

// Column positions in the billing report (0-based).
const COL_NUMBER: usize = 1;
const COL_DATE: usize = 2;
const COL_REFERENCE: usize = 4;
const COL_GIVEN_NAME: usize = 5;
const COL_SURNAME: usize = 6;
const COL_TAX_ID: usize = 7;
const COL_KIND: usize = 8;
const COL_DESCRIPTION: usize = 14;
const COL_AMOUNT: usize = 15;

/// Import a comma-delimited billing report.
///
/// Fails only if the input cannot be read; malformed rows drop the invoice
/// they belong to and are listed in [`Imported::failures`].
pub fn import_csv<R: Read>(
    mut reader: R,
    options: &ImportOptions,
    sink: &mut dyn EventSink,
) -> Result<Imported, ConvertError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let body = data_section(text.trim_start_matches('\u{feff}'), options.csv_header_rows);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut builders: IndexMap<String, InvoiceBuilder> = IndexMap::new();
    let mut poisoned: HashSet<String> = HashSet::new();
    let mut encounter_order = IndexSet::new();
    let mut failures = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let row = options.csv_header_rows + i + 1;
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            break;
        }

        let number = match field(&record, COL_NUMBER, row) {
            Ok(n) if !n.trim().is_empty() => n.trim().to_string(),
            Ok(_) => {
                let error = ConvertError::Parse(format!("row {row}: empty invoice number"));
                sink.emit(Event::error(error.to_string()));
                failures.push(ImportFailure { invoice: None, error });
                continue;
            }
            Err(error) => {
                sink.emit(Event::error(error.to_string()));
                failures.push(ImportFailure { invoice: None, error });
                continue;
            }
        };
        encounter_order.insert(number.clone());
        if poisoned.contains(&number) {
            continue;
        }

        if let Err(error) = apply_row(&record, row, &number, &mut builders, options) {
            sink.emit(Event::error(error.to_string()).invoice(&number));
            builders.shift_remove(&number);
            poisoned.insert(number.clone());
            failures.push(ImportFailure {
                invoice: Some(number),
                error,
            });
            continue;
        }
        sink.emit(Event::debug("imported invoice row").invoice(&number));
    }

    let mut invoices = IndexMap::with_capacity(builders.len());
    for (number, builder) in builders {
        match builder.build() {
            Ok(invoice) => {
                sink.emit(Event::info("imported invoice").invoice(&number));
                invoices.insert(number, invoice);
            }
            Err(error) => {
                sink.emit(Event::error(error.to_string()).invoice(&number));
                failures.push(ImportFailure {
                    invoice: Some(number),
                    error,
                });
            }
        }
    }

    Ok(Imported {
        invoices,
        failures,
        encounter_order,
    })
}

/// Fold one data row into the builder of its invoice.
fn apply_row(
    record: &StringRecord,
    row: usize,
    number: &str,
    builders: &mut IndexMap<String, InvoiceBuilder>,
    options: &ImportOptions,
) -> Result<(), ConvertError> {
    let kind = DocumentKind::from_label(field(record, COL_KIND, row)?);
    let description = field(record, COL_DESCRIPTION, row)?.trim().to_string();
    let raw_amount = field(record, COL_AMOUNT, row)?;
    let sign = credit_note_sign(&kind, has_parenthesis(raw_amount));
    let cents = parse_csv_cents(raw_amount)
        .map_err(|e| ConvertError::Parse(format!("row {row}: {e}")))?
        * sign;

    if !builders.contains_key(number) {
        let date = parse_csv_date(field(record, COL_DATE, row)?)
            .map_err(|e| ConvertError::Parse(format!("row {row}: {e}")))?;
        let builder = InvoiceBuilder::new(number, kind, date)
            .reference(field(record, COL_REFERENCE, row)?.trim())
            .customer(
                field(record, COL_SURNAME, row)?,
                field(record, COL_GIVEN_NAME, row)?,
            )
            .tax_id(field(record, COL_TAX_ID, row)?)
            .stamp_duty_label(options.stamp_duty_label.as_str());
        builders.insert(number.to_string(), builder);
    }

    let builder = builders
        .get_mut(number)
        .ok_or_else(|| ConvertError::Parse(format!("row {row}: invoice {number} vanished")))?;
    if description == options.withholding_label {
        builder.set_withholding_tax(cents);
    } else {
        builder.push_line(description, cents);
    }
    Ok(())
}

fn field(record: &StringRecord, index: usize, row: usize) -> Result<&str, ConvertError> {
    record
        .get(index)
        .ok_or_else(|| ConvertError::Parse(format!("row {row}: missing column {}", index + 1)))
}

/// Skip `header_rows` physical lines and cut the text at the first empty line.
fn data_section(text: &str, header_rows: usize) -> &str {
    let mut start = 0;
    for (skipped, line) in text.split_inclusive('\n').enumerate() {
        if skipped == header_rows {
            break;
        }
        start += line.len();
    }
    let rest = &text[start..];

    let mut end = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim().is_empty() {
            break;
        }
        end += line.len();
    }
    &rest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemorySink;

    const HEADER: &str = "Report fatturato\nPeriodo,01/01/2020,31/01/2020\n\nProtocollo,Numero,Data\n";

    fn row(number: &str, kind: &str, desc: &str, amount: &str) -> String {
        format!(
            ",{number},31/01/2020,,,MARIO,ROSSI,RSSMRA80A01G702X,{kind},,,,,,{desc},\"{amount}\"\n"
        )
    }

    fn import(text: &str) -> Imported {
        let mut sink = MemorySink::new();
        import_csv(text.as_bytes(), &ImportOptions::default(), &mut sink).unwrap()
    }

    #[test]
    fn data_section_skips_header_and_stops_at_blank() {
        let text = "h1\nh2\n\nh4\nrow1\nrow2\n\nfooter\n";
        assert_eq!(data_section(text, 4), "row1\nrow2\n");
    }

    #[test]
    fn data_section_crlf() {
        let text = "h1\r\nh2\r\nh3\r\nh4\r\nrow1\r\n\r\nfooter\r\n";
        assert_eq!(data_section(text, 4), "row1\r\n");
    }

    #[test]
    fn groups_rows_by_number() {
        let text = format!(
            "{HEADER}{}{}{}",
            row("CCSR/00001", "Fattura", "Visita", "€ 100,00"),
            row("CCSR/00001", "Fattura", "Bollo", "€ 2,00"),
            row("CCSR/00002", "Fattura", "Visita", "€ 1.234,56"),
        );
        let imported = import(&text);
        assert!(imported.failures.is_empty());
        let keys: Vec<_> = imported.invoices.keys().cloned().collect();
        assert_eq!(keys, ["CCSR/00001", "CCSR/00002"]);
        let first = &imported.invoices["CCSR/00001"];
        assert_eq!(first.total_amount, 10200);
        assert_eq!(first.stamp_duty, Some(200));
        assert_eq!(first.customer_name, "ROSSI MARIO");
        assert_eq!(imported.invoices["CCSR/00002"].total_amount, 123456);
    }

    #[test]
    fn bad_amount_drops_whole_invoice() {
        let text = format!(
            "{HEADER}{}{}{}",
            row("CCSR/00001", "Fattura", "Visita", "€ 100,00"),
            row("CCSR/00001", "Fattura", "Esami", "n.d."),
            row("CCSR/00002", "Fattura", "Visita", "€ 50,00"),
        );
        let imported = import(&text);
        assert_eq!(imported.invoices.len(), 1);
        assert!(imported.invoices.contains_key("CCSR/00002"));
        assert_eq!(imported.failures.len(), 1);
        assert_eq!(imported.failures[0].invoice.as_deref(), Some("CCSR/00001"));
    }

    #[test]
    fn short_row_is_a_parse_error() {
        let text = format!("{HEADER},CCSR/00009,31/01/2020\n");
        let imported = import(&text);
        assert!(imported.invoices.is_empty());
        assert!(matches!(imported.failures[0].error, ConvertError::Parse(_)));
    }
}
