//! Record type 5: health-expense declaration (Tessera Sanitaria).
//!
//! Fifty "art. 21" slots, each with a type triplet further down the
//! record. Slot 0 always carries the invoice; with stamp-duty splitting
//! the stamp duty moves to slot 1 and slot 0 keeps the remainder.

use super::config::EncoderConfig;
use super::layout::{FieldSpec as F, LayoutSpec, Record, Segment as S};
use super::pack::{signed_amount, slice, text};
use super::record0::document_number;
use super::RECORD_WIDTH;
use crate::core::{ConvertError, Invoice, TaxId};

pub const EXPENSE_SLOTS: usize = 50;

const EXPENSE_BLOCK: [F; 9] = [
    F::numeric("TRF-A21CO-ANAG", 6),
    F::alpha("TRF-A21CO-COFI", 16),
    F::numeric("TRF-A21CO-DATA", 8),
    F::alpha("TRF-A21CO-FLAG", 1),
    F::numeric("TRF-A21CO-ALQ", 3),
    F::numeric("TRF-A21CO-IMPORTO", 14),
    F::numeric("TRF-A21CO-IMPOSTA", 14),
    F::numeric("TRF-A21CO-NDOC", 8),
    F::alpha("TRF-A21CO-CONTRATTO", 40),
];

const TYPE_BLOCK: [F; 3] = [
    F::alpha("TRF-A21CO-TIPO", 1),
    F::alpha("TRF-A21CO-TIPO-SPESA", 2),
    F::alpha("TRF-A21CO-FLAG-SPESA", 1),
];

const PAYMENT_FLAG: [F; 1] = [F::alpha("TRF-A21CO-PAGAM", 1)];

pub const RECORD_5: LayoutSpec = LayoutSpec {
    name: "record 5",
    width: RECORD_WIDTH,
    segments: &[
        S::Field(F::numeric("TRF5-DITTA", 5)),
        S::Field(F::numeric("TRF5-VERSIONE", 1)),
        S::Field(F::fixed("TRF5-TARC", "5")),
        S::Field(F::alpha("TRF-ART21-CONTRATTO", 1200)),
        S::Repeat(EXPENSE_SLOTS, &EXPENSE_BLOCK),
        S::Field(F::numeric("TRF-RIF-FATT-NDOC", 8)),
        S::Field(F::numeric("TRF-RIF-FATT-DDOC", 8)),
        S::Repeat(EXPENSE_SLOTS, &TYPE_BLOCK),
        S::Field(F::alpha("TRF-SPESE-FUNEBRI", 1)),
        S::Repeat(2, &PAYMENT_FLAG),
        S::Field(F::alpha("TRF5-FILLER", 75)),
    ],
};

/// One populated expense slot.
struct Expense<'a> {
    amount: i64,
    expense_type: &'a str,
}

pub(crate) fn fill(
    record: &mut Record<'_>,
    invoice: &Invoice,
    tax_id: &TaxId,
    config: &EncoderConfig,
) -> Result<(), ConvertError> {
    record.set("TRF5-DITTA", &config.company_code)?;
    record.set("TRF5-VERSIONE", &config.format_version)?;

    let stamp_duty = invoice
        .stamp_duty
        .filter(|&amount| config.split_stamp_duty && amount != 0);
    let ordinary = invoice
        .total_amount
        .checked_sub(stamp_duty.unwrap_or(0))
        .ok_or_else(|| ConvertError::Encoding("total minus stamp duty overflows".into()))?;
    let mut expenses = vec![Expense {
        amount: ordinary,
        expense_type: &config.health_expense_type,
    }];
    if let Some(amount) = stamp_duty {
        expenses.push(Expense {
            amount,
            expense_type: &config.stamp_duty_expense_type,
        });
    }

    let cofi = text(tax_id.as_str(), 16)?;
    let date = invoice.date_ddmmyyyy();
    let ndoc = format!("0{}00", document_number(&invoice.number, config)?);

    for (slot, expense) in expenses.iter().enumerate() {
        record.set_at("TRF-A21CO-COFI", slot, &cofi)?;
        record.set_at("TRF-A21CO-DATA", slot, &date)?;
        record.set_at("TRF-A21CO-FLAG", slot, "S")?;
        record.set_at("TRF-A21CO-IMPORTO", slot, &signed_amount(expense.amount, 13)?)?;
        record.set_at("TRF-A21CO-NDOC", slot, &ndoc)?;

        record.set_at("TRF-A21CO-TIPO", slot, "F")?;
        record.set_at("TRF-A21CO-TIPO-SPESA", slot, expense.expense_type)?;
        record.set_at("TRF-A21CO-FLAG-SPESA", slot, &config.expense_flag)?;
        record.set_at("TRF-A21CO-PAGAM", slot, "S")?;
    }

    if invoice.is_credit_note() {
        let original = slice(
            &invoice.reference,
            config.document_number_start,
            config.document_number_width,
        )?;
        record.set("TRF-RIF-FATT-NDOC", &format!("{original:0>8}"))?;
    }
    Ok(())
}
