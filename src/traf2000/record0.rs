//! Record type 0: accounting header.
//!
//! Customer master data, causale, document dates, the eight VAT blocks,
//! the eight revenue-account blocks and the withholding tax. Everything
//! else is reserved space the accounting package expects in a fixed shape.

use super::config::EncoderConfig;
use super::layout::{FieldSpec as F, LayoutSpec, Record, Segment as S};
use super::pack::{right_justify, signed_amount, slice, text, zero_pad};
use super::RECORD_WIDTH;
use crate::core::{ConvertError, DocumentKind, Invoice, TaxId};

/// VAT and revenue-account blocks available per invoice.
pub const LINE_SLOTS: usize = 8;

const VAT_BLOCK: [F; 3] = [
    F::numeric("TRF-IMPONIB", 12),
    F::numeric("TRF-ALIQ", 3),
    F::numeric("TRF-ALIQ-AGRICOLA..IMPOSTA", 16),
];

const REVENUE_BLOCK: [F; 2] = [F::numeric("TRF-CONTO-RIC", 7), F::numeric("TRF-IMP-RIC", 12)];

const PAYMENT_BLOCK: [F; 5] = [
    F::numeric("TRF-CONTO", 7),
    F::alpha("TRF-DA", 1),
    F::numeric("TRF-IMPORTO", 12),
    F::alpha("TRF-CAU-AGGIUNT", 18),
    F::numeric("TRF-EC-PARTITA-PAG..IMP-VAL", 26),
];

const ANALYTIC_BLOCK: [F; 2] = [
    F::alpha("TRF-RIFER-TAB", 1),
    F::numeric("TRF-IND-RIGA..DT-FIN", 18),
];

pub const RECORD_0: LayoutSpec = LayoutSpec {
    name: "record 0",
    width: RECORD_WIDTH,
    segments: &[
        S::Field(F::numeric("TRF-DITTA", 5)),
        S::Field(F::numeric("TRF-VERSIONE", 1)),
        S::Field(F::fixed("TRF-TARC", "0")),
        S::Field(F::numeric("TRF-COD-CLIFOR", 5)),
        S::Field(F::alpha("TRF-RASO", 32)),
        S::Field(F::alpha("TRF-IND", 30)),
        S::Field(F::numeric("TRF-CAP", 5)),
        S::Field(F::alpha("TRF-CITTA", 25)),
        S::Field(F::alpha("TRF-PROV", 2)),
        S::Field(F::alpha("TRF-COFI", 16)),
        S::Field(F::numeric("TRF-PIVA", 11)),
        S::Field(F::alpha("TRF-PF", 1)),
        S::Field(F::numeric("TRF-DIVIDE", 2)),
        S::Field(F::numeric("TRF-PAESE", 4)),
        S::Field(F::alpha("TRF-PIVA-ESTERO", 12)),
        S::Field(F::alpha("TRF-COFI-ESTERO", 20)),
        S::Field(F::alpha("TRF-SESSO", 1)),
        S::Field(F::numeric("TRF-DTNAS", 8)),
        S::Field(F::alpha("TRF-COMNA..FAX-NUM", 64)),
        S::Field(F::numeric("TRF-CFCONTO..CFINTERM", 22)),
        S::Field(F::numeric("TRF-CAUSALE", 3)),
        S::Field(F::alpha("TRF-CAU-DES", 15)),
        S::Field(F::alpha("TRF-CAU-AGG", 18)),
        S::Field(F::alpha("TRF-CAU-AGG-1", 34)),
        S::Field(F::alpha("TRF-CAU-AGG-2", 34)),
        S::Field(F::numeric("TRF-DATA-REGISTRAZIONE", 8)),
        S::Field(F::numeric("TRF-DATA-DOC", 8)),
        S::Field(F::numeric("TRF-NUM-DOC-FOR", 8)),
        S::Field(F::alpha("TRF-NDOC", 5)),
        S::Field(F::numeric("TRF-SERIE", 2)),
        S::Field(F::numeric("TRF-EC-PARTITA..PLAFOND", 72)),
        S::Repeat(LINE_SLOTS, &VAT_BLOCK),
        S::Field(F::numeric("TRF-TOT-FAT", 12)),
        S::Repeat(LINE_SLOTS, &REVENUE_BLOCK),
        S::Field(F::numeric("TRF-CAU-PAG", 3)),
        S::Field(F::alpha("TRF-CAU-DES-PAGAM", 15)),
        S::Field(F::alpha("TRF-CAU-AGG-1-PAGAM", 34)),
        S::Field(F::alpha("TRF-CAU-AGG-2-PAGAM", 34)),
        S::Repeat(80, &PAYMENT_BLOCK),
        S::Repeat(10, &ANALYTIC_BLOCK),
        S::Field(F::numeric("TRF-DOC6", 6)),
        S::Field(F::fixed("TRF-AN-OMONIMI", "N")),
        S::Field(F::fixed("TRF-AN-TIPO-SOGG", "0")),
        S::Field(F::numeric("TRF-EC-PARTITA-SEZ-PAG", 160)),
        S::Field(F::numeric("TRF-NUM-DOC-PAG-PROF..DATA", 15)),
        S::Field(F::numeric("TRF-RIT-ACC", 12)),
        S::Field(F::numeric("TRF-RIT-PREV..RIT-4", 60)),
        S::Field(F::numeric("TRF-UNITA-RICAVI", 16)),
        S::Field(F::numeric("TRF-UNITA-PAGAM", 160)),
        S::Field(F::alpha("TRF-FAX-PREF-1..FAX-NUM-1", 24)),
        S::Field(F::alpha("TRF-SOLO-CLIFOR", 1)),
        S::Field(F::alpha("TRF-80-SEGUENTE", 1)),
        S::Field(F::numeric("TRF-CONTO-RIT-ACC", 7)),
        S::Field(F::numeric("TRF-CONTO-RIT-PREV..RIT-4", 35)),
        S::Field(F::fixed("TRF-DIFFERIMENTO-IVA", "N")),
        S::Field(F::fixed("TRF-STORICO", "N")),
        S::Field(F::numeric("TRF-STORICO-DATA", 8)),
        S::Field(F::numeric("TRF-CAUS-ORI", 3)),
        S::Field(F::alpha("TRF-PREV-TIPOMOV", 1)),
        S::Field(F::alpha("TRF-PREV-RATRIS", 1)),
        S::Field(F::numeric("TRF-PREV-DTCOMP-INI", 8)),
        S::Field(F::numeric("TRF-PREV-DTCOMP-FIN", 8)),
        S::Field(F::alpha("TRF-PREV-FLAG-CONT", 1)),
        S::Field(F::alpha("TRF-RIFERIMENTO", 20)),
        S::Field(F::numeric("TRF-CAUS-PREST-ANA..CONTO-IVA-VEN-ACQ", 21)),
        S::Field(F::alpha("TRF-PIVA-VECCHIA..RISERVATO", 44)),
        S::Field(F::numeric("TRF-DATA-IVA-AGVIAGGI", 8)),
        S::Field(F::alpha("TRF-DATI-AGG-ANA-REC4", 1)),
        S::Field(F::numeric("TRF-RIF-IVA-NOTE-CRED", 6)),
        S::Field(F::alpha("TRF-RIF-IVA-ANNO-PREC", 1)),
        S::Field(F::numeric("TRF-NATURA-GIURIDICA", 2)),
        S::Field(F::alpha("TRF-STAMPA-ELENCO", 1)),
        S::Field(F::numeric("TRF-PERC-FORF", 24)),
        S::Field(F::alpha("TRF-SOLO-MOV-IVA..USA-COFI-VECCHIO", 20)),
        S::Field(F::numeric("TRF-ESIGIBILITA-IVA", 1)),
        S::Field(F::alpha("TRF-TIPO-MOV-RISCONTI..BLACKLIST-ANAG", 4)),
        S::Field(F::numeric("TRF-BLACKLIST-IVA-ANNO", 6)),
        S::Field(F::alpha("TRF-CONTEA-ESTERO", 20)),
        S::Field(F::fixed("TRF-ART21-ANAG", "S")),
        S::Field(F::fixed("TRF-ART21-IVA", "N")),
        S::Field(F::alpha("TRF-RIF-FATTURA", 1)),
        S::Field(F::fixed("TRF-RISERVATO-B", "S")),
        S::Field(F::alpha("TRF-MASTRO-CF", 1)),
        S::Field(F::alpha("TRF-MOV-PRIVATO", 1)),
        S::Field(F::fixed("TRF-SPESE-MEDICHE", "S")),
        S::Field(F::alpha("TRF-FILLER", 2)),
    ],
};

/// Causale code and description of a document kind.
pub fn causale(kind: &DocumentKind) -> Result<(&'static str, &'static str), ConvertError> {
    match kind {
        DocumentKind::Invoice => Ok(("001", "FATTURA VENDITA")),
        DocumentKind::CreditNote => Ok(("002", "N.C. A CLIENTE")),
        DocumentKind::Other(label) => Err(ConvertError::Unsupported(format!(
            "no causale for document type '{label}'"
        ))),
    }
}

pub(crate) fn fill(
    record: &mut Record<'_>,
    invoice: &Invoice,
    tax_id: &TaxId,
    config: &EncoderConfig,
) -> Result<(), ConvertError> {
    record.set("TRF-DITTA", &config.company_code)?;
    record.set("TRF-VERSIONE", &config.format_version)?;
    record.set("TRF-RASO", &text(&invoice.customer_name, 32)?)?;

    match tax_id {
        TaxId::PersonalCode(code) => {
            record.set("TRF-COFI", &text(code, 16)?)?;
            record.set("TRF-PF", "S")?;
        }
        TaxId::VatNumber(vat) => {
            record.set("TRF-PIVA", &right_justify(vat, 11)?)?;
            record.set("TRF-PF", "N")?;
        }
    }
    record.set("TRF-DIVIDE", &zero_pad(invoice.name_split_index as u64, 2)?)?;

    let (code, description) = causale(&invoice.kind)?;
    record.set("TRF-CAUSALE", code)?;
    record.set("TRF-CAU-DES", &text(description, 15)?)?;

    let date = invoice.date_ddmmyyyy();
    record.set("TRF-DATA-REGISTRAZIONE", &date)?;
    record.set("TRF-DATA-DOC", &date)?;
    record.set("TRF-NDOC", &document_number(&invoice.number, config)?)?;

    if invoice.line_items.len() > LINE_SLOTS {
        return Err(ConvertError::Encoding(format!(
            "{} line items, record 0 holds at most {LINE_SLOTS}",
            invoice.line_items.len()
        )));
    }
    for (slot, (description, &amount)) in invoice.line_items.iter().enumerate() {
        let stamp_duty = *description == config.stamp_duty_label;
        let (rate, account) = if stamp_duty {
            (&config.stamp_duty_tax_rate_code, &config.stamp_duty_revenue_account)
        } else {
            (&config.ordinary_tax_rate_code, &config.ordinary_revenue_account)
        };
        let amount = signed_amount(amount, 11)?;
        record.set_at("TRF-IMPONIB", slot, &amount)?;
        record.set_at("TRF-ALIQ", slot, rate)?;
        record.set_at("TRF-CONTO-RIC", slot, account)?;
        record.set_at("TRF-IMP-RIC", slot, &amount)?;
    }
    record.set("TRF-TOT-FAT", &signed_amount(invoice.total_amount, 11)?)?;

    if invoice.withholding_tax != 0 {
        record.set("TRF-RIT-ACC", &signed_amount(invoice.withholding_tax, 11)?)?;
    }
    record.set(
        "TRF-RIF-FATTURA",
        if invoice.is_credit_note() { "S" } else { "N" },
    )?;
    Ok(())
}

/// The configured slice of the invoice number, right-justified to 5.
pub(crate) fn document_number(number: &str, config: &EncoderConfig) -> Result<String, ConvertError> {
    let part = slice(
        number,
        config.document_number_start,
        config.document_number_width,
    )?;
    right_justify(&part, 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn causale_per_kind() {
        assert_eq!(causale(&DocumentKind::Invoice).unwrap(), ("001", "FATTURA VENDITA"));
        assert_eq!(causale(&DocumentKind::CreditNote).unwrap(), ("002", "N.C. A CLIENTE"));
        assert!(causale(&DocumentKind::Other("Preventivo".into())).is_err());
    }

    #[test]
    fn document_number_slices() {
        let config = EncoderConfig::default();
        assert_eq!(document_number("CCSR/00123", &config).unwrap(), "/0012");
        let config = EncoderConfig::builder().document_number_slice(5, 5).build();
        assert_eq!(document_number("CCSR/00123", &config).unwrap(), "00123");
    }

    #[test]
    fn declared_width() {
        assert_eq!(RECORD_0.declared_width(), RECORD_WIDTH);
    }
}
