use indexmap::IndexMap;

use super::error::ValidationError;
use super::events::{Channel, Event, EventSink};
use super::types::*;

/// Check whether an invoice is structurally eligible for TRAF2000 output.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let DocumentKind::Other(label) = &invoice.kind {
        errors.push(ValidationError::new(
            &invoice.number,
            "kind",
            format!("document must be an invoice or a credit note, found '{label}'"),
        ));
    }

    // Accept exactly 16 (codice fiscale) or 11 (partita IVA) characters.
    if TaxId::classify(&invoice.tax_id).is_none() {
        errors.push(ValidationError::new(
            &invoice.number,
            "tax_id",
            format!(
                "tax id must be 16 or 11 characters, found {}",
                invoice.tax_id.chars().count()
            ),
        ));
    }

    errors.extend(validate_totals(invoice));
    errors
}

/// Check that the total equals the sum of the line items.
pub fn validate_totals(invoice: &Invoice) -> Vec<ValidationError> {
    let sum = invoice.line_total();
    if sum != invoice.total_amount {
        return vec![ValidationError::new(
            &invoice.number,
            "total_amount",
            format!(
                "total {} does not match line item sum {}",
                invoice.total_amount, sum
            ),
        )];
    }
    Vec::new()
}

/// An invoice excluded from output, with every reason found.
#[derive(Debug, Clone)]
pub struct Rejected {
    pub invoice: Invoice,
    pub errors: Vec<ValidationError>,
}

/// Invoices sorted by what happens to them next, each list in import order.
#[derive(Debug, Clone, Default)]
pub struct Triage {
    /// Invoices to encode.
    pub accepted: Vec<Invoice>,
    /// Credit notes, diverted to the credit-note report.
    pub credit_notes: Vec<Invoice>,
    /// Invoices that failed validation.
    pub rejected: Vec<Rejected>,
}

/// Validate every imported invoice and route it.
///
/// Rejections are reported through `sink` and never abort the run.
/// Credit notes that pass validation go to the credit-note channel.
pub fn triage(invoices: IndexMap<String, Invoice>, sink: &mut dyn EventSink) -> Triage {
    let mut out = Triage::default();

    for (_, invoice) in invoices {
        let errors = validate_invoice(&invoice);
        if !errors.is_empty() {
            for e in &errors {
                sink.emit(Event::error(format!("{}: {}", e.field, e.message)).invoice(&invoice.number));
            }
            out.rejected.push(Rejected { invoice, errors });
            continue;
        }

        if invoice.is_credit_note() {
            sink.emit(
                Event::info("credit note not converted")
                    .invoice(&invoice.number)
                    .channel(Channel::CreditNotes),
            );
            out.credit_notes.push(invoice);
            continue;
        }

        out.accepted.push(invoice);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InvoiceBuilder, MemorySink, Severity};
    use chrono::NaiveDate;

    fn invoice(number: &str, kind: DocumentKind, tax_id: &str) -> Invoice {
        InvoiceBuilder::new(number, kind, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
            .customer("BIANCHI", "ANNA")
            .tax_id(tax_id)
            .add_line("Ricovero", 150000)
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_both_tax_id_lengths() {
        assert!(validate_invoice(&invoice("1", DocumentKind::Invoice, "BNCNNA80A41G702Y")).is_empty());
        assert!(validate_invoice(&invoice("2", DocumentKind::Invoice, "01234567890")).is_empty());
    }

    #[test]
    fn rejects_other_lengths() {
        let errors = validate_invoice(&invoice("3", DocumentKind::Invoice, "123"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tax_id");
    }

    #[test]
    fn rejects_unknown_kind() {
        let errors = validate_invoice(&invoice(
            "4",
            DocumentKind::Other("Proforma".into()),
            "01234567890",
        ));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "kind");
    }

    #[test]
    fn detects_tampered_total() {
        let mut inv = invoice("5", DocumentKind::Invoice, "01234567890");
        inv.total_amount += 1;
        let errors = validate_invoice(&inv);
        assert_eq!(errors[0].field, "total_amount");
    }

    #[test]
    fn triage_routes_in_order() {
        let mut map = IndexMap::new();
        for inv in [
            invoice("A", DocumentKind::Invoice, "01234567890"),
            invoice("B", DocumentKind::CreditNote, "01234567890"),
            invoice("C", DocumentKind::Invoice, "bad"),
            invoice("D", DocumentKind::CreditNote, "BNCNNA80A41G702Y"),
        ] {
            map.insert(inv.number.clone(), inv);
        }
        let mut sink = MemorySink::new();
        let t = triage(map, &mut sink);

        let numbers = |v: &[Invoice]| v.iter().map(|i| i.number.clone()).collect::<Vec<_>>();
        assert_eq!(numbers(&t.accepted), ["A"]);
        assert_eq!(numbers(&t.credit_notes), ["B", "D"]);
        assert_eq!(t.rejected.len(), 1);
        assert_eq!(sink.at_least(Severity::Error).count(), 1);
        assert_eq!(sink.channel(Channel::CreditNotes).count(), 2);
    }
}
