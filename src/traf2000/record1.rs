//! Record type 1: original document and customs residue.
//!
//! Only the original document number is filled; the rest is reserved.

use super::config::EncoderConfig;
use super::layout::{FieldSpec as F, LayoutSpec, Record, Segment as S};
use super::pack::right_justify;
use super::RECORD_WIDTH;
use crate::core::{ConvertError, Invoice};

const INTRASTAT_BLOCK: [F; 8] = [
    F::alpha("TRF-NOMENCLATURA", 8),
    F::numeric("TRF-IMP-LIRE", 12),
    F::numeric("TRF-IMP-VAL", 12),
    F::alpha("TRF-NATURA", 1),
    F::numeric("TRF-MASSA..VAL-STAT", 36),
    F::alpha("TRF-REGIME..TRASPORTO", 2),
    F::numeric("TRF-PAESE-PROV..PROV-DEST", 9),
    F::alpha("TRF-PROV-ORIG..SEGNO-RET", 5),
];

const INSTALMENT_BLOCK: [F; 2] = [
    F::numeric("TRF-POR-NUM-RATA..IMPORTO-BOLLIVAL", 65),
    F::alpha("TRF-POR-FLAG..TIPO-RD", 2),
];

const CURRENCY_BLOCK: [F; 2] = [
    F::alpha("TRF-COD-VAL-IV", 3),
    F::numeric("TRF-IMP-VALUTA-IV", 16),
];

const SERVICE_BLOCK: [F; 6] = [
    F::alpha("TRF-CODICE-SERVIZIO", 6),
    F::numeric("TRF-STATO-PAGAMENTO..DATA-DOC-ORIG", 35),
    F::alpha("TRF-MOD-EROGAZIONE..MOD-INCASSO", 2),
    F::numeric("TRF-PROT-REG..ANNO-REG-RET", 20),
    F::alpha("TRF-NUM-DOC-ORIG..SERV-COD-VAL-IV", 19),
    F::numeric("TRF-SERV-IMP-VALUTA-IV", 16),
];

pub const RECORD_1: LayoutSpec = LayoutSpec {
    name: "record 1",
    width: RECORD_WIDTH,
    segments: &[
        S::Field(F::numeric("TRF1-DITTA", 5)),
        S::Field(F::numeric("TRF1-VERSIONE", 1)),
        S::Field(F::fixed("TRF1-TARC", "1")),
        S::Field(F::numeric("TRF-NUM-AUTOFATT", 5)),
        S::Field(F::numeric("TRF-SERIE-AUTOFATT", 2)),
        S::Field(F::alpha("TRF-COD-VAL", 3)),
        S::Field(F::numeric("TRF-TOTVAL", 14)),
        S::Repeat(20, &INTRASTAT_BLOCK),
        S::Field(F::alpha("TRF-INTRA-TIPO", 1)),
        S::Field(F::numeric("TRF-MESE-ANNO-RIF", 6)),
        S::Field(F::alpha("TRF1-SPAZIO", 173)),
        S::Field(F::numeric("TRF-RITA-TIPO..RITA-IMPRA", 45)),
        S::Field(F::alpha("TRF-RITA-PRONS..RITA-CAUSA", 4)),
        S::Field(F::numeric("TRF-RITA-TRIBU..RITA-IMPAG", 20)),
        S::Field(F::alpha("TRF-RITA-TPAG..RITA-QUIETANZA", 28)),
        S::Field(F::numeric("TRF-RITA-NUM-BOLL..RITA-CRED", 25)),
        S::Field(F::alpha("TRF-RITA-SOGG", 1)),
        S::Field(F::numeric("TRF-RITA-BASEIMP..RITA-CTO-DITT", 44)),
        S::Field(F::alpha("TRF1-FILLER-RITA", 11)),
        S::Field(F::numeric("TRF-RITA-DATA..RITA-TOTIVA", 64)),
        S::Field(F::numeric("TRF-CAUS-PREST-ANA-B..RITA-CAUSA-B", 6)),
        S::Field(F::alpha("TRF1-FILLER-B", 178)),
        S::Field(F::numeric("TRF-POR-CODPAG..POR-AGENZIA", 13)),
        S::Field(F::alpha("TRF-POR-DESAGENZIA", 30)),
        S::Field(F::numeric("TRF-POR-TOT-RATE..POR-TOTDOC", 14)),
        S::Repeat(12, &INSTALMENT_BLOCK),
        S::Field(F::numeric("TRF-POR-CODAGE", 4)),
        S::Field(F::alpha("TRF-POR-EFFETTO-SOSP..SPAZIO", 336)),
        S::Repeat(20, &CURRENCY_BLOCK),
        S::Repeat(20, &SERVICE_BLOCK),
        S::Field(F::alpha("TRF-INTRA-TIPO-SERVIZIO", 1)),
        S::Field(F::numeric("TRF-SERV-MESE-ANNO-RIF", 6)),
        S::Field(F::alpha("TRF-CK-RCHARGE", 8)),
        S::Field(F::numeric("TRF-XNUM-DOC-ORI", 15)),
        S::Field(F::alpha("TRF-MEM-ESIGIB-IVA", 1)),
        S::Field(F::numeric("TRF-COD-IDENTIFICATIVO", 2)),
        S::Field(F::alpha("TRF-ID-IMPORTAZIONE..FILLER", 1090)),
    ],
};

pub(crate) fn fill(
    record: &mut Record<'_>,
    invoice: &Invoice,
    config: &EncoderConfig,
) -> Result<(), ConvertError> {
    record.set("TRF1-DITTA", &config.company_code)?;
    record.set("TRF1-VERSIONE", &config.format_version)?;
    record.set("TRF-XNUM-DOC-ORI", &right_justify(&invoice.number, 15)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_width() {
        assert_eq!(RECORD_1.declared_width(), RECORD_WIDTH);
    }
}
