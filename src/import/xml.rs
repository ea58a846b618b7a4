//! XML report importer (`STAT_FATTURATO_CTERZI`).
//!
//! Each `Dettagli` element is an invoice whose attributes carry the header;
//! the `Dettagli2` elements nested under it are its lines. Namespaces and
//! prefixes are ignored, only local names are matched.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use super::amount::{parse_iso_date, parse_xml_cents};
use super::schema::{self, SchemaViolation};
use super::{ImportFailure, ImportOptions, Imported, SchemaCheck, credit_note_sign};
use crate::core::{ConvertError, DocumentKind, Event, EventSink, InvoiceBuilder};

pub(crate) const INVOICE_ELEMENT: &str = "Dettagli";
pub(crate) const LINE_ELEMENT: &str = "Dettagli2";

pub(crate) const ATTR_NUMBER: &str = "protocollo_fatturatestata";
pub(crate) const ATTR_KIND: &str = "fat_ndc";
pub(crate) const ATTR_REFERENCE: &str = "protocollo_fatturatestata1";
pub(crate) const ATTR_DATE: &str = "data_fatturatestata";
pub(crate) const ATTR_SURNAME: &str = "cognome_cliente";
pub(crate) const ATTR_GIVEN_NAME: &str = "nome_cliente";
pub(crate) const ATTR_TAX_ID: &str = "cf_piva_cliente";
pub(crate) const ATTR_DESCRIPTION: &str = "descrizione_fatturariga1";
pub(crate) const ATTR_UNIT_PRICE: &str = "prezzounitario_fatturariga1";

type Attrs = HashMap<String, String>;

/// An invoice element with its line elements, before conversion.
#[derive(Debug, Default)]
struct RawInvoice {
    header: Attrs,
    lines: Vec<Attrs>,
}

/// Import an XML billing report.
///
/// A document that is not well-formed fails the import. With
/// [`SchemaCheck::Enforce`] so does any schema violation; with
/// [`SchemaCheck::Report`] violations are emitted as warnings.
pub fn import_xml(
    xml: &str,
    options: &ImportOptions,
    sink: &mut dyn EventSink,
) -> Result<Imported, ConvertError> {
    check_schema(xml, options.schema_check, sink)?;

    let raw = collect_invoices(xml)?;

    let mut builders: IndexMap<String, InvoiceBuilder> = IndexMap::new();
    let mut poisoned: HashSet<String> = HashSet::new();
    let mut encounter_order = IndexSet::new();
    let mut failures = Vec::new();

    for (index, inv) in raw.into_iter().enumerate() {
        let number = inv
            .header
            .get(ATTR_NUMBER)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let Some(number) = number else {
            let error = ConvertError::Parse(format!(
                "invoice element #{}: missing attribute '{ATTR_NUMBER}'",
                index + 1
            ));
            sink.emit(Event::error(error.to_string()));
            failures.push(ImportFailure { invoice: None, error });
            continue;
        };

        encounter_order.insert(number.clone());
        if poisoned.contains(&number) {
            continue;
        }

        let result = match builders.get_mut(&number) {
            Some(builder) => add_lines(&inv, builder, options),
            None => new_builder(&inv, &number, options).and_then(|mut builder| {
                add_lines(&inv, &mut builder, options)?;
                builders.insert(number.clone(), builder);
                Ok(())
            }),
        };
        if let Err(error) = result {
            sink.emit(Event::error(error.to_string()).invoice(&number));
            builders.shift_remove(&number);
            poisoned.insert(number.clone());
            failures.push(ImportFailure {
                invoice: Some(number),
                error,
            });
            continue;
        }
        sink.emit(Event::debug("imported invoice element").invoice(&number));
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

fn check_schema(
    xml: &str,
    check: SchemaCheck,
    sink: &mut dyn EventSink,
) -> Result<(), ConvertError> {
    if check == SchemaCheck::Skip {
        return Ok(());
    }
    let violations: Vec<SchemaViolation> = schema::validate_schema(xml)?;
    if violations.is_empty() {
        return Ok(());
    }
    match check {
        SchemaCheck::Enforce => Err(ConvertError::Parse(format!(
            "document does not match the report schema ({} violation(s)), first: {}",
            violations.len(),
            violations[0]
        ))),
        _ => {
            for v in &violations {
                sink.emit(Event::warning(format!("schema: {v}")));
            }
            Ok(())
        }
    }
}

/// Start the builder of an invoice from the header of its first element.
fn new_builder(
    inv: &RawInvoice,
    number: &str,
    options: &ImportOptions,
) -> Result<InvoiceBuilder, ConvertError> {
    let kind = DocumentKind::from_label(required(&inv.header, ATTR_KIND)?);
    let date = parse_iso_date(required(&inv.header, ATTR_DATE)?)?;
    Ok(InvoiceBuilder::new(number, kind, date)
        .reference(inv.header.get(ATTR_REFERENCE).map(|r| r.trim()).unwrap_or(""))
        .customer(
            required(&inv.header, ATTR_SURNAME)?,
            required(&inv.header, ATTR_GIVEN_NAME)?,
        )
        .tax_id(required(&inv.header, ATTR_TAX_ID)?)
        .stamp_duty_label(options.stamp_duty_label.as_str()))
}

/// Add the line elements of one invoice element.
///
/// Every line is parsed before any is added, so a failing element leaves
/// the builder untouched.
fn add_lines(
    inv: &RawInvoice,
    builder: &mut InvoiceBuilder,
    options: &ImportOptions,
) -> Result<(), ConvertError> {
    let kind = builder.kind().clone();
    let mut parsed = Vec::with_capacity(inv.lines.len());
    for line in &inv.lines {
        let description = required(line, ATTR_DESCRIPTION)?.trim().to_string();
        let raw = required(line, ATTR_UNIT_PRICE)?;
        let mut cents = parse_xml_cents(raw)?;
        if kind == DocumentKind::CreditNote {
            // A minus sign in the source means the value is already negative.
            cents = cents
                .checked_abs()
                .ok_or_else(|| ConvertError::Parse(format!("amount out of range '{raw}'")))?
                * credit_note_sign(&kind, raw.contains('-'));
        }
        parsed.push((description, cents));
    }

    for (description, cents) in parsed {
        if description == options.withholding_label {
            builder.set_withholding_tax(cents);
        } else {
            builder.push_line(description, cents);
        }
    }
    Ok(())
}

fn required<'a>(attrs: &'a Attrs, name: &str) -> Result<&'a str, ConvertError> {
    attrs
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ConvertError::Parse(format!("missing attribute '{name}'")))
}

/// Walk the document and gather every invoice element with its lines.
fn collect_invoices(xml: &str) -> Result<Vec<RawInvoice>, ConvertError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut invoices = Vec::new();
    let mut current: Option<RawInvoice> = None;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(ref e)) => match local_name(e).as_str() {
                INVOICE_ELEMENT => {
                    current = Some(RawInvoice {
                        header: attributes(e)?,
                        lines: Vec::new(),
                    });
                }
                LINE_ELEMENT => {
                    if let Some(inv) = current.as_mut() {
                        inv.lines.push(attributes(e)?);
                    }
                }
                _ => {}
            },
            Ok(XmlEvent::Empty(ref e)) => match local_name(e).as_str() {
                INVOICE_ELEMENT => invoices.push(RawInvoice {
                    header: attributes(e)?,
                    lines: Vec::new(),
                }),
                LINE_ELEMENT => {
                    if let Some(inv) = current.as_mut() {
                        inv.lines.push(attributes(e)?);
                    }
                }
                _ => {}
            },
            Ok(XmlEvent::End(ref e)) => {
                if e.local_name().as_ref() == INVOICE_ELEMENT.as_bytes() {
                    if let Some(inv) = current.take() {
                        invoices.push(inv);
                    }
                }
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

    Ok(invoices)
}

pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Attributes of an element keyed by local name, values unescaped.
pub(crate) fn attributes(e: &BytesStart<'_>) -> Result<Attrs, ConvertError> {
    let mut attrs = Attrs::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConvertError::Xml(format!("bad attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ConvertError::Xml(format!("bad attribute value: {err}")))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}
