//! End-to-end runs: export file in, TRAF2000 file and reports out.
//!
//! Run with: `cargo test --test pipeline_tests`

#![cfg(all(feature = "csv", feature = "xml", feature = "traf2000"))]

use std::fs;

use traf2000::core::*;
use traf2000::import::{ImportOptions, InputFormat, SchemaCheck};
use traf2000::pipeline::*;
use traf2000::traf2000::{EncoderConfig, LineEnding, RECORD_WIDTH, write_credit_note_report};

const HEADER: &str = "STAT_FATTURATO_CTERZI\nDal,01/01/2020,Al,31/01/2020\n\nStruttura,Protocollo,Data,Pag,Rif,Nome,Cognome,CF,Tipo,A,B,C,D,E,Descrizione,Importo\n";

fn row(number: &str, kind: &str, tax_id: &str, desc: &str, amount: &str) -> String {
    format!(
        "CCSR,{number},20/01/2020,,CCSR/00001,ANNA,BIANCHI,{tax_id},{kind},,,,,,{desc},\"{amount}\"\n"
    )
}

fn export() -> String {
    [
        HEADER.to_string(),
        row("CCSR/00001", "Fattura", "BNCNNA80A41G702Y", "Visita", "€ 120,00"),
        row("CCSR/00001", "Fattura", "BNCNNA80A41G702Y", "Bollo", "€ 2,00"),
        row("CCSR/00002", "Nota di credito", "BNCNNA80A41G702Y", "Visita", "€ 120,00"),
        row("CCSR/00003", "Fattura", "123", "Visita", "€ 50,00"),
        row("CCSR/00004", "Preventivo", "01234567890", "Visita", "€ 50,00"),
        row("CCSR/00005", "Fattura", "01234567890", "Ecografia", "€ 1.080,00"),
        row("CCSR/00006", "Nota di credito", "01234567890", "Ecografia", "(80,00)"),
        "\n".to_string(),
        "Totale,,,,,,,,,,,,,,,\"€ 1.292,00\"\n".to_string(),
    ]
    .concat()
}

#[test]
fn file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fatturato.csv");
    let output = dir.path().join("TRAF2000");
    fs::write(&input, export()).unwrap();

    let converter = Converter::new(Settings::default()).unwrap();
    let mut sink = MemorySink::new();
    let report = converter.convert_file(&input, &output, &mut sink).unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.encoded().collect::<Vec<_>>(), ["CCSR/00001", "CCSR/00005"]);

    let text = fs::read_to_string(&output).unwrap();
    let records: Vec<_> = text.split_terminator("\r\n").collect();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.len() == RECORD_WIDTH));
    assert!(!text.contains("CCSR/00002"));
    assert!(!text.contains("CCSR/00006"));

    let outcomes: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| format!("{}: {}", o.invoice.as_deref().unwrap_or("?"), o.outcome))
        .collect();
    assert_eq!(
        outcomes,
        [
            "CCSR/00001: encoded",
            "CCSR/00002: credit note, not converted",
            "CCSR/00003: rejected: tax_id: tax id must be 16 or 11 characters, found 3;",
            "CCSR/00004: rejected: kind: document must be an invoice or a credit note, found 'Preventivo';",
            "CCSR/00005: encoded",
            "CCSR/00006: credit note, not converted",
        ]
    );

    assert!(
        sink.events()
            .iter()
            .any(|e| e.message.starts_with("conversion finished: 2 written, 2 credit notes, 2 skipped"))
    );
}

#[test]
fn credit_note_report() {
    let converter = Converter::new(Settings::default()).unwrap();
    let mut out = Vec::new();
    let report = converter
        .convert_reader(InputFormat::Csv, export().as_bytes(), &mut out, &mut MemorySink::new())
        .unwrap();

    let mut text = Vec::new();
    write_credit_note_report(&mut text, &report.credit_notes).unwrap();
    let text = String::from_utf8(text).unwrap();

    insta::assert_snapshot!(text.trim_end(), @r"
    Note di credito:
    CCSR/00002 del 20/01/2020 - BIANCHI ANNA - -120.00
    CCSR/00006 del 20/01/2020 - BIANCHI ANNA - 80.00
    ");
}

#[test]
fn nothing_written_when_input_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.xml");
    let output = dir.path().join("TRAF2000");
    fs::write(&input, "<Report><Dettagli></Report>").unwrap();

    let converter = Converter::new(Settings::default()).unwrap();
    let result = converter.convert_file(&input, &output, &mut MemorySink::new());
    assert!(matches!(result, Err(ConvertError::Xml(_))));
    assert!(!output.exists());
}

#[test]
fn unsupported_extension_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fatturato.txt");
    let output = dir.path().join("TRAF2000");
    fs::write(&input, export()).unwrap();

    let converter = Converter::new(Settings::default()).unwrap();
    let result = converter.convert_file(&input, &output, &mut MemorySink::new());
    assert!(matches!(result, Err(ConvertError::Unsupported(_))));
    assert!(!output.exists());
}

#[test]
fn xml_run_with_settings_file() {
    let settings: Settings = serde_json::from_str(
        r#"{
            "import": { "schema_check": "Enforce" },
            "encoder": { "split_stamp_duty": false, "line_ending": "Lf" }
        }"#,
    )
    .unwrap();
    assert_eq!(settings.import.schema_check, SchemaCheck::Enforce);
    assert_eq!(settings.encoder.line_ending, LineEnding::Lf);

    let xml = r#"<?xml version="1.0"?>
<Report xmlns="STAT_FATTURATO_CTERZI">
  <Dettagli protocollo_fatturatestata="CCSR/00010" fat_ndc="Fattura" data_fatturatestata="2020-01-20T00:00:00" cognome_cliente="GALLO" nome_cliente="PIETRO" cf_piva_cliente="GLLPTR80A01G702Q">
    <Dettagli2 descrizione_fatturariga1="Visita" prezzounitario_fatturariga1="100.00"/>
    <Dettagli2 descrizione_fatturariga1="Bollo" prezzounitario_fatturariga1="2.00"/>
  </Dettagli>
</Report>"#;

    let converter = Converter::new(settings).unwrap();
    let mut out = Vec::new();
    let report = converter
        .convert_reader(InputFormat::Xml, xml.as_bytes(), &mut out, &mut MemorySink::new())
        .unwrap();
    assert_eq!(report.written, 1);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.len(), 3 * (RECORD_WIDTH + 1));
    assert!(!text.contains('\r'));
    // Legacy record 5: the whole total sits in the first slot.
    assert!(text.contains("GLLPTR80A01G702Q20012020S0000000000010200+"));
}

#[test]
fn invalid_encoder_settings() {
    let settings = Settings {
        import: ImportOptions::default(),
        encoder: EncoderConfig::builder().expense_flag("22").build(),
    };
    assert!(matches!(Converter::new(settings), Err(ConvertError::Layout(_))));
}
