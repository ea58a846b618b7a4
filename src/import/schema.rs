//! Structural check of the XML report against its published shape.
//!
//! Mirrors the report's XSD for the parts the importer relies on: the
//! report namespace, the required attributes of invoice and line elements,
//! and the lexical form of dates and amounts.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::amount::parse_iso_date;
use super::xml::*;
use crate::core::ConvertError;

/// Namespace declared by the report server for this report.
pub const REPORT_NAMESPACE: &str = "STAT_FATTURATO_CTERZI";

const INVOICE_REQUIRED: [&str; 6] = [
    ATTR_NUMBER,
    ATTR_KIND,
    ATTR_DATE,
    ATTR_SURNAME,
    ATTR_GIVEN_NAME,
    ATTR_TAX_ID,
];

const LINE_REQUIRED: [&str; 2] = [ATTR_DESCRIPTION, ATTR_UNIT_PRICE];

/// One mismatch between the document and the report schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Byte offset of the offending element.
    pub position: u64,
    /// Local name of the element.
    pub element: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> at byte {}: {}", self.element, self.position, self.message)
    }
}

/// Check a report document and return every violation found.
///
/// Fails only when the document is not well-formed XML.
pub fn validate_schema(xml: &str) -> Result<Vec<SchemaViolation>, ConvertError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut violations = Vec::new();
    let mut seen_root = false;
    let mut invoice_depth: Option<usize> = None;
    let mut depth = 0usize;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(XmlEvent::Start(ref e)) => {
                if !seen_root {
                    seen_root = true;
                    check_root(e, position, &mut violations);
                }
                depth += 1;
                if check_element(e, position, invoice_depth.is_some(), &mut violations)? {
                    invoice_depth = Some(depth);
                }
            }
            Ok(XmlEvent::Empty(ref e)) => {
                if !seen_root {
                    seen_root = true;
                    check_root(e, position, &mut violations);
                }
                check_element(e, position, invoice_depth.is_some(), &mut violations)?;
            }
            Ok(XmlEvent::End(_)) => {
                if invoice_depth == Some(depth) {
                    invoice_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => {
                return Err(ConvertError::Xml(format!(
                    "parse error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if !seen_root {
        violations.push(SchemaViolation {
            position: 0,
            element: String::new(),
            message: "document has no root element".into(),
        });
    }

    Ok(violations)
}

fn check_root(e: &BytesStart<'_>, position: u64, violations: &mut Vec<SchemaViolation>) {
    let declares_namespace = e.attributes().flatten().any(|a| {
        let key = a.key.as_ref();
        (key == b"xmlns" || key.starts_with(b"xmlns:")) && a.value.as_ref() == REPORT_NAMESPACE.as_bytes()
    });
    if !declares_namespace {
        violations.push(SchemaViolation {
            position,
            element: local_name(e),
            message: format!("root element does not declare namespace '{REPORT_NAMESPACE}'"),
        });
    }
}

/// Check one element. Returns `true` if it opens an invoice.
fn check_element(
    e: &BytesStart<'_>,
    position: u64,
    inside_invoice: bool,
    violations: &mut Vec<SchemaViolation>,
) -> Result<bool, ConvertError> {
    let name = local_name(e);
    let mut violation = |message: String| {
        violations.push(SchemaViolation {
            position,
            element: name.clone(),
            message,
        })
    };

    match name.as_str() {
        INVOICE_ELEMENT => {
            let attrs = attributes(e)?;
            for required in INVOICE_REQUIRED {
                if !attrs.contains_key(required) {
                    violation(format!("missing required attribute '{required}'"));
                }
            }
            if let Some(date) = attrs.get(ATTR_DATE) {
                if parse_iso_date(date).is_err() {
                    violation(format!("'{ATTR_DATE}' is not an ISO-8601 date: '{date}'"));
                }
            }
            Ok(true)
        }
        LINE_ELEMENT => {
            if !inside_invoice {
                violation(format!("line element outside of <{INVOICE_ELEMENT}>"));
            }
            let attrs = attributes(e)?;
            for required in LINE_REQUIRED {
                if !attrs.contains_key(required) {
                    violation(format!("missing required attribute '{required}'"));
                }
            }
            if let Some(price) = attrs.get(ATTR_UNIT_PRICE) {
                let trimmed = price.trim();
                if Decimal::from_str(trimmed).is_err() && Decimal::from_scientific(trimmed).is_err() {
                    violation(format!("'{ATTR_UNIT_PRICE}' is not a decimal: '{price}'"));
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_document() {
        let xml = r#"<Report xmlns="STAT_FATTURATO_CTERZI"><Dettagli protocollo_fatturatestata="1" fat_ndc="Fattura" data_fatturatestata="2020-01-31T00:00:00" cognome_cliente="A" nome_cliente="B" cf_piva_cliente="01234567890"><Dettagli2 descrizione_fatturariga1="Visita" prezzounitario_fatturariga1="10.00"/></Dettagli></Report>"#;
        assert!(validate_schema(xml).unwrap().is_empty());
    }

    #[test]
    fn reports_every_violation() {
        let xml = r#"<Report><Dettagli protocollo_fatturatestata="1" data_fatturatestata="yesterday"/><Dettagli2 descrizione_fatturariga1="Visita" prezzounitario_fatturariga1="ten"/></Report>"#;
        let v = validate_schema(xml).unwrap();
        let messages: Vec<_> = v.iter().map(|v| v.message.as_str()).collect();
        assert!(messages[0].contains("namespace"));
        assert!(messages.iter().any(|m| m.contains("'fat_ndc'")));
        assert!(messages.iter().any(|m| m.contains("not an ISO-8601 date")));
        assert!(messages.iter().any(|m| m.contains("outside of")));
        assert!(messages.iter().any(|m| m.contains("not a decimal")));
    }

    #[test]
    fn not_well_formed() {
        assert!(matches!(
            validate_schema("<Report><a></Report>"),
            Err(ConvertError::Xml(_))
        ));
    }
}
