use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Description of the stamp-duty line item (imposta di bollo).
pub const STAMP_DUTY_LABEL: &str = "Bollo";

/// Description of the withholding-tax row in billing exports.
pub const WITHHOLDING_TAX_LABEL: &str = "Ritenuta d'acconto";

/// An invoice as normalized by the importers.
///
/// All amounts are signed integer cents. Built once per distinct invoice
/// number during import and never mutated once encoding starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number (protocollo), unique within a run.
    pub number: String,
    /// Document type.
    pub kind: DocumentKind,
    /// Number of the original invoice, only meaningful for credit notes.
    pub reference: String,
    /// Document date.
    pub date: NaiveDate,
    /// Surname plus the first two given names, ASCII only.
    pub customer_name: String,
    /// Length of the surname plus one: where the given names start
    /// inside `customer_name`.
    pub name_split_index: usize,
    /// Codice fiscale (16 chars) or partita IVA (11 digits).
    pub tax_id: String,
    /// Sum of all line items, in cents.
    pub total_amount: i64,
    /// Withholding tax (ritenuta d'acconto) in cents, zero if none.
    pub withholding_tax: i64,
    /// Line items in source order: description → cents.
    pub line_items: IndexMap<String, i64>,
    /// Amount of the stamp-duty line, if the invoice has one.
    pub stamp_duty: Option<i64>,
}

impl Invoice {
    /// Document date in the `ddmmyyyy` wire format.
    pub fn date_ddmmyyyy(&self) -> String {
        self.date.format("%d%m%Y").to_string()
    }

    pub fn is_credit_note(&self) -> bool {
        self.kind == DocumentKind::CreditNote
    }

    /// Sum of the line items, recomputed.
    pub fn line_total(&self) -> i64 {
        self.line_items.values().sum()
    }
}

/// Document type of an imported invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// "Fattura".
    Invoice,
    /// "Nota di credito".
    CreditNote,
    /// Any other document type found in the source; rejected by validation.
    Other(String),
}

impl DocumentKind {
    /// Label used by the billing platform.
    pub fn label(&self) -> &str {
        match self {
            Self::Invoice => "Fattura",
            Self::CreditNote => "Nota di credito",
            Self::Other(label) => label,
        }
    }

    /// Parse a billing-platform label. Unknown labels are kept as `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Fattura" => Self::Invoice,
            "Nota di credito" => Self::CreditNote,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A customer tax identifier, classified by its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxId {
    /// 16-character codice fiscale of a private person.
    PersonalCode(String),
    /// 11-digit partita IVA of a company.
    VatNumber(String),
}

impl TaxId {
    pub const PERSONAL_CODE_LEN: usize = 16;
    pub const VAT_NUMBER_LEN: usize = 11;

    /// Classify a raw tax id. Returns `None` for any length other than 16 or 11.
    pub fn classify(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.is_ascii() {
            return None;
        }
        match raw.len() {
            Self::PERSONAL_CODE_LEN => Some(Self::PersonalCode(raw.to_string())),
            Self::VAT_NUMBER_LEN => Some(Self::VatNumber(raw.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PersonalCode(s) | Self::VatNumber(s) => s,
        }
    }

    /// `true` when the customer is a natural person.
    pub fn is_person(&self) -> bool {
        matches!(self, Self::PersonalCode(_))
    }
}
