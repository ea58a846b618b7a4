use chrono::NaiveDate;
use indexmap::IndexMap;

use super::error::ConvertError;
use super::name::CustomerName;
use super::types::*;

/// Builder that aggregates source rows into one [`Invoice`].
///
/// Importers create one builder per distinct invoice number and feed it
/// every line they find; `build()` derives the total, the stamp duty and
/// the customer display name.
///
/// ```
/// use traf2000::core::*;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("CCSR/00123", DocumentKind::Invoice, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .customer("ROSSI", "MARIO")
///     .tax_id("RSSMRA80A01G702X")
///     .add_line("Visita specialistica", 10000)
///     .add_line("Bollo", 200)
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.total_amount, 10200);
/// assert_eq!(invoice.stamp_duty, Some(200));
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    number: String,
    kind: DocumentKind,
    date: NaiveDate,
    reference: String,
    surname: String,
    given_name: String,
    tax_id: String,
    withholding_tax: i64,
    lines: IndexMap<String, i64>,
    stamp_duty_label: String,
    overflow: Option<String>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, kind: DocumentKind, date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            kind,
            date,
            reference: String::new(),
            surname: String::new(),
            given_name: String::new(),
            tax_id: String::new(),
            withholding_tax: 0,
            lines: IndexMap::new(),
            stamp_duty_label: STAMP_DUTY_LABEL.to_string(),
            overflow: None,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn customer(mut self, surname: impl Into<String>, given_name: impl Into<String>) -> Self {
        self.surname = surname.into();
        self.given_name = given_name.into();
        self
    }

    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = tax_id.into().trim().to_string();
        self
    }

    /// Description that marks the stamp-duty line (default `"Bollo"`).
    pub fn stamp_duty_label(mut self, label: impl Into<String>) -> Self {
        self.stamp_duty_label = label.into();
        self
    }

    /// Add a line item. Repeated descriptions accumulate into one entry.
    pub fn add_line(mut self, description: impl Into<String>, cents: i64) -> Self {
        self.push_line(description, cents);
        self
    }

    /// In-place variant of [`add_line`](Self::add_line) for importers.
    ///
    /// An amount that overflows the accumulated line makes `build()` fail.
    pub fn push_line(&mut self, description: impl Into<String>, cents: i64) {
        let description = description.into();
        let entry = self.lines.entry(description.clone()).or_insert(0);
        match entry.checked_add(cents) {
            Some(sum) => *entry = sum,
            None => {
                self.overflow.get_or_insert(description);
            }
        }
    }

    pub fn withholding_tax(mut self, cents: i64) -> Self {
        self.withholding_tax = cents;
        self
    }

    /// In-place variant of [`withholding_tax`](Self::withholding_tax).
    pub fn set_withholding_tax(&mut self, cents: i64) {
        self.withholding_tax = cents;
    }

    pub fn build(self) -> Result<Invoice, ConvertError> {
        if self.number.trim().is_empty() {
            return Err(ConvertError::Parse("invoice number is empty".into()));
        }

        if let Some(description) = &self.overflow {
            return Err(ConvertError::Parse(format!(
                "invoice {}: line '{description}' overflows",
                self.number
            )));
        }
        let total_amount = self
            .lines
            .values()
            .try_fold(0i64, |acc, &cents| acc.checked_add(cents))
            .ok_or_else(|| {
                ConvertError::Parse(format!("invoice {}: total overflows", self.number))
            })?;

        let name = CustomerName::new(&self.surname, &self.given_name);
        let stamp_duty = self.lines.get(&self.stamp_duty_label).copied();

        Ok(Invoice {
            number: self.number,
            kind: self.kind,
            reference: self.reference,
            date: self.date,
            customer_name: name.display,
            name_split_index: name.split_index,
            tax_id: self.tax_id,
            total_amount,
            withholding_tax: self.withholding_tax,
            line_items: self.lines,
            stamp_duty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn repeated_descriptions_accumulate() {
        let inv = InvoiceBuilder::new("A/1", DocumentKind::Invoice, date())
            .add_line("Visita", 5000)
            .add_line("Visita", 2500)
            .build()
            .unwrap();
        assert_eq!(inv.line_items.len(), 1);
        assert_eq!(inv.line_items["Visita"], 7500);
        assert_eq!(inv.total_amount, 7500);
    }

    #[test]
    fn withholding_not_in_total() {
        let inv = InvoiceBuilder::new("A/2", DocumentKind::Invoice, date())
            .add_line("Visita", 10000)
            .withholding_tax(2000)
            .build()
            .unwrap();
        assert_eq!(inv.total_amount, 10000);
        assert_eq!(inv.withholding_tax, 2000);
        assert_eq!(inv.stamp_duty, None);
    }

    #[test]
    fn empty_number_rejected() {
        let err = InvoiceBuilder::new("  ", DocumentKind::Invoice, date())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }

    #[test]
    fn overflowing_line_fails_build() {
        let err = InvoiceBuilder::new("A/4", DocumentKind::Invoice, date())
            .add_line("Visita", i64::MAX)
            .add_line("Visita", 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }

    #[test]
    fn overflowing_total_fails_build() {
        let err = InvoiceBuilder::new("A/5", DocumentKind::Invoice, date())
            .add_line("Visita", i64::MAX)
            .add_line("Esami", 1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("total overflows"));
    }

    #[test]
    fn custom_stamp_duty_label() {
        let inv = InvoiceBuilder::new("A/3", DocumentKind::Invoice, date())
            .stamp_duty_label("Imposta di bollo")
            .add_line("Imposta di bollo", 200)
            .build()
            .unwrap();
        assert_eq!(inv.stamp_duty, Some(200));
    }
}
