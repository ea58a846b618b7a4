//! Encoder configuration.

use serde::{Deserialize, Serialize};

use crate::core::{ConvertError, STAMP_DUTY_LABEL};

/// Line terminator written after every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineEnding {
    /// `\r\n`, what the accounting package expects on import.
    #[default]
    CrLf,
    /// `\n`.
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrLf => "\r\n",
            Self::Lf => "\n",
        }
    }
}

/// Codes and switches of the TRAF2000 encoder.
///
/// The defaults are those of the current revision, which splits the stamp
/// duty into its own health-expense slot. [`EncoderConfig::legacy`] gives
/// the earlier single-slot output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Company code (TRF-DITTA), 5 digits.
    pub company_code: String,
    /// Format version (TRF-VERSIONE), 1 digit.
    pub format_version: String,
    /// VAT code for ordinary lines, 3 digits.
    pub ordinary_tax_rate_code: String,
    /// VAT code for the stamp-duty line, 3 digits.
    pub stamp_duty_tax_rate_code: String,
    /// Revenue account for ordinary lines, 7 digits.
    pub ordinary_revenue_account: String,
    /// Revenue account for the stamp-duty line, 7 digits.
    pub stamp_duty_revenue_account: String,
    /// Line description that identifies the stamp duty.
    pub stamp_duty_label: String,
    /// First character of the invoice number copied into TRF-NDOC.
    pub document_number_start: usize,
    /// Number of characters copied into TRF-NDOC.
    pub document_number_width: usize,
    /// Health-expense type of the ordinary slot, 2 characters.
    pub health_expense_type: String,
    /// Health-expense type of the stamp-duty slot, 2 characters.
    pub stamp_duty_expense_type: String,
    /// Health-expense flag, 1 character.
    pub expense_flag: String,
    /// Report the stamp duty in its own record 5 slot.
    pub split_stamp_duty: bool,
    pub line_ending: LineEnding,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            company_code: "04103".into(),
            format_version: "3".into(),
            ordinary_tax_rate_code: "308".into(),
            stamp_duty_tax_rate_code: "315".into(),
            ordinary_revenue_account: "4004300".into(),
            stamp_duty_revenue_account: "4004500".into(),
            stamp_duty_label: STAMP_DUTY_LABEL.into(),
            document_number_start: 4,
            document_number_width: 5,
            health_expense_type: "SR".into(),
            stamp_duty_expense_type: "AA".into(),
            expense_flag: "2".into(),
            split_stamp_duty: true,
            line_ending: LineEnding::CrLf,
        }
    }
}

impl EncoderConfig {
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::default()
    }

    /// First revision: one health-expense slot holding the whole total.
    pub fn legacy() -> Self {
        Self {
            split_stamp_duty: false,
            ..Self::default()
        }
    }

    /// Check every code against the width of the field it is written to.
    pub fn validate(&self) -> Result<(), ConvertError> {
        digits("company_code", &self.company_code, 5)?;
        digits("format_version", &self.format_version, 1)?;
        digits("ordinary_tax_rate_code", &self.ordinary_tax_rate_code, 3)?;
        digits("stamp_duty_tax_rate_code", &self.stamp_duty_tax_rate_code, 3)?;
        digits("ordinary_revenue_account", &self.ordinary_revenue_account, 7)?;
        digits("stamp_duty_revenue_account", &self.stamp_duty_revenue_account, 7)?;
        exact("health_expense_type", &self.health_expense_type, 2)?;
        exact("stamp_duty_expense_type", &self.stamp_duty_expense_type, 2)?;
        exact("expense_flag", &self.expense_flag, 1)?;
        if self.stamp_duty_label.trim().is_empty() {
            return Err(ConvertError::Layout("stamp_duty_label is empty".into()));
        }
        if self.document_number_width == 0 || self.document_number_width > 5 {
            return Err(ConvertError::Layout(format!(
                "document_number_width must be 1..=5, got {}",
                self.document_number_width
            )));
        }
        Ok(())
    }
}

fn exact(name: &str, value: &str, width: usize) -> Result<(), ConvertError> {
    if !value.is_ascii() || value.len() != width {
        return Err(ConvertError::Layout(format!(
            "{name} must be {width} ASCII characters, got '{value}'"
        )));
    }
    Ok(())
}

fn digits(name: &str, value: &str, width: usize) -> Result<(), ConvertError> {
    exact(name, value, width)?;
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConvertError::Layout(format!(
            "{name} must be numeric, got '{value}'"
        )));
    }
    Ok(())
}

/// Builder for [`EncoderConfig`].
///
/// # Example
///
/// ```
/// use traf2000::traf2000::{EncoderConfigBuilder, LineEnding};
///
/// let config = EncoderConfigBuilder::default()
///     .company_code("04103")
///     .split_stamp_duty(false)
///     .line_ending(LineEnding::Lf)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct EncoderConfigBuilder {
    config: EncoderConfig,
}

impl EncoderConfigBuilder {
    pub fn company_code(mut self, code: impl Into<String>) -> Self {
        self.config.company_code = code.into();
        self
    }

    pub fn format_version(mut self, version: impl Into<String>) -> Self {
        self.config.format_version = version.into();
        self
    }

    /// Set the ordinary and stamp-duty VAT codes.
    pub fn tax_rate_codes(mut self, ordinary: impl Into<String>, stamp_duty: impl Into<String>) -> Self {
        self.config.ordinary_tax_rate_code = ordinary.into();
        self.config.stamp_duty_tax_rate_code = stamp_duty.into();
        self
    }

    /// Set the ordinary and stamp-duty revenue accounts.
    pub fn revenue_accounts(mut self, ordinary: impl Into<String>, stamp_duty: impl Into<String>) -> Self {
        self.config.ordinary_revenue_account = ordinary.into();
        self.config.stamp_duty_revenue_account = stamp_duty.into();
        self
    }

    pub fn stamp_duty_label(mut self, label: impl Into<String>) -> Self {
        self.config.stamp_duty_label = label.into();
        self
    }

    /// Which characters of the invoice number go into TRF-NDOC.
    pub fn document_number_slice(mut self, start: usize, width: usize) -> Self {
        self.config.document_number_start = start;
        self.config.document_number_width = width;
        self
    }

    pub fn expense_types(mut self, ordinary: impl Into<String>, stamp_duty: impl Into<String>) -> Self {
        self.config.health_expense_type = ordinary.into();
        self.config.stamp_duty_expense_type = stamp_duty.into();
        self
    }

    pub fn expense_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.expense_flag = flag.into();
        self
    }

    pub fn split_stamp_duty(mut self, split: bool) -> Self {
        self.config.split_stamp_duty = split;
        self
    }

    pub fn line_ending(mut self, ending: LineEnding) -> Self {
        self.config.line_ending = ending;
        self
    }

    pub fn build(self) -> EncoderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EncoderConfig::default().validate().is_ok());
        assert!(EncoderConfig::legacy().validate().is_ok());
        assert!(!EncoderConfig::legacy().split_stamp_duty);
    }

    #[test]
    fn rejects_bad_widths() {
        let config = EncoderConfig::builder().company_code("4103").build();
        assert!(matches!(config.validate(), Err(ConvertError::Layout(_))));

        let config = EncoderConfig::builder().tax_rate_codes("30A", "315").build();
        assert!(config.validate().is_err());

        let config = EncoderConfig::builder().document_number_slice(4, 6).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_from_serde_defaults() {
        let config: EncoderConfig =
            serde_json::from_str(r#"{"split_stamp_duty": false, "line_ending": "Lf"}"#).unwrap();
        assert!(!config.split_stamp_duty);
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.company_code, "04103");
    }
}
