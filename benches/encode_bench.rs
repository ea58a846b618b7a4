use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use traf2000::core::*;
use traf2000::import::{ImportOptions, import_csv};
use traf2000::traf2000::{EncodedInvoice, Encoder, EncoderConfig, LineEnding, write_traf2000};

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()
}

fn build_invoice(n: usize) -> Invoice {
    InvoiceBuilder::new(format!("CCSR/{n:05}"), DocumentKind::Invoice, test_date())
        .customer("ROSSI", "MARIO LUIGI")
        .tax_id("RSSMRA80A01G702X")
        .add_line("Visita cardiologica", 12000)
        .add_line("Elettrocardiogramma", 4500)
        .add_line("Ecocardiogramma", 9000)
        .add_line("Bollo", 200)
        .build()
        .unwrap()
}

fn build_csv(rows: usize) -> String {
    let mut text = String::from(
        "STAT_FATTURATO_CTERZI\nDal,01/01/2020,Al,31/01/2020\n\n\
         Struttura,Protocollo,Data,Pag,Rif,Nome,Cognome,CF,Tipo,A,B,C,D,E,Descrizione,Importo\n",
    );
    for i in 0..rows {
        text.push_str(&format!(
            "CCSR,CCSR/{:05},15/01/2020,,,MARIO,ROSSI,RSSMRA80A01G702X,Fattura,,,,,,Visita {},\"€ 1.200,50\"\n",
            i / 4,
            i % 4
        ));
    }
    text
}

fn bench_encode_one(c: &mut Criterion) {
    let encoder = Encoder::new(EncoderConfig::default()).unwrap();
    let invoice = build_invoice(1);
    c.bench_function("encode_invoice", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&invoice))));
    });
}

fn bench_encode_batch(c: &mut Criterion) {
    let encoder = Encoder::new(EncoderConfig::default()).unwrap();
    let invoices: Vec<Invoice> = (1..=100).map(build_invoice).collect();
    c.bench_function("encode_and_write_100_invoices", |b| {
        b.iter(|| {
            let encoded: Vec<EncodedInvoice> = invoices
                .iter()
                .map(|i| encoder.encode(i).unwrap())
                .collect();
            let mut out = Vec::with_capacity(encoded.len() * 3 * 7003);
            write_traf2000(&mut out, &encoded, LineEnding::CrLf).unwrap();
            black_box(out)
        });
    });
}

fn bench_compile_layouts(c: &mut Criterion) {
    c.bench_function("encoder_new", |b| {
        b.iter(|| black_box(Encoder::new(EncoderConfig::default())));
    });
}

fn bench_csv_import(c: &mut Criterion) {
    let text = build_csv(400);
    let options = ImportOptions::default();
    c.bench_function("csv_import_400_rows", |b| {
        b.iter(|| {
            black_box(import_csv(
                black_box(text.as_bytes()),
                &options,
                &mut MemorySink::new(),
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_encode_one,
    bench_encode_batch,
    bench_compile_layouts,
    bench_csv_import,
);
criterion_main!(benches);
