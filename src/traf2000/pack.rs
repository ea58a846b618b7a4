//! Packing primitives for fixed-width TRAF2000 fields.

use crate::core::ConvertError;

/// Non-negative number, right-justified and zero-padded to `width`.
pub fn zero_pad(value: u64, width: usize) -> Result<String, ConvertError> {
    let s = format!("{value:0>width$}");
    if s.len() > width {
        return Err(ConvertError::Encoding(format!(
            "{value} does not fit in {width} digits"
        )));
    }
    Ok(s)
}

/// Signed amount: magnitude zero-padded to `width` digits, then `+` or `-`.
///
/// The result is `width + 1` characters long.
pub fn signed_amount(value: i64, width: usize) -> Result<String, ConvertError> {
    let mut s = zero_pad(value.unsigned_abs(), width)?;
    s.push(if value < 0 { '-' } else { '+' });
    Ok(s)
}

/// Reverse of [`signed_amount`]. Returns `None` for malformed fields.
pub fn unpack_signed_amount(field: &str) -> Option<i64> {
    let sign = field.chars().last()?;
    let digits = &field[..field.len() - sign.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.parse::<u64>().ok()?;
    match sign {
        '+' => i64::try_from(magnitude).ok(),
        '-' => 0i64.checked_sub_unsigned(magnitude),
        _ => None,
    }
}

/// Unused alphanumeric zone.
pub fn blank(width: usize) -> String {
    " ".repeat(width)
}

/// Unused numeric zone.
pub fn zero_fill(width: usize) -> String {
    "0".repeat(width)
}

/// Left-justified text, truncated or space-padded to exactly `width`.
///
/// Text must already be ASCII; anything else is rejected rather than
/// silently shifting every later field.
pub fn text(value: &str, width: usize) -> Result<String, ConvertError> {
    if !value.is_ascii() {
        return Err(ConvertError::Encoding(format!(
            "'{value}' contains non-ASCII characters"
        )));
    }
    let cut = &value[..value.len().min(width)];
    Ok(format!("{cut:<width$}"))
}

/// Right-justified code, zero-padded to exactly `width`. Longer input is
/// an error.
pub fn right_justify(value: &str, width: usize) -> Result<String, ConvertError> {
    if !value.is_ascii() {
        return Err(ConvertError::Encoding(format!(
            "'{value}' contains non-ASCII characters"
        )));
    }
    if value.len() > width {
        return Err(ConvertError::Encoding(format!(
            "'{value}' is longer than {width} characters"
        )));
    }
    Ok(format!("{value:0>width$}"))
}

/// Characters `start..start + width` of `value`, zero-padded on the left
/// when the value is too short.
pub fn slice(value: &str, start: usize, width: usize) -> Result<String, ConvertError> {
    let part: String = value.chars().skip(start).take(width).collect();
    right_justify(&part, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pad_basic() {
        assert_eq!(zero_pad(6, 2).unwrap(), "06");
        assert_eq!(zero_pad(0, 3).unwrap(), "000");
        assert!(zero_pad(100, 2).is_err());
    }

    #[test]
    fn signed_amount_sign_after_digits() {
        assert_eq!(signed_amount(10200, 11).unwrap(), "00000010200+");
        assert_eq!(signed_amount(-12345, 11).unwrap(), "00000012345-");
        assert_eq!(signed_amount(0, 11).unwrap(), "00000000000+");
        assert!(signed_amount(-1_000_000_000_000, 11).is_err());
    }

    #[test]
    fn signed_amount_min_value() {
        let s = signed_amount(i64::MIN, 19).unwrap();
        assert_eq!(s, "9223372036854775808-");
    }

    #[test]
    fn unpack() {
        assert_eq!(unpack_signed_amount("00000012345-"), Some(-12345));
        assert_eq!(unpack_signed_amount("00000000001+"), Some(1));
        assert_eq!(unpack_signed_amount("000000000000"), None);
        assert_eq!(unpack_signed_amount("+"), None);
        assert_eq!(unpack_signed_amount(""), None);
    }

    #[test]
    fn text_pads_and_truncates() {
        assert_eq!(text("ROSSI MARIO", 15).unwrap(), "ROSSI MARIO    ");
        assert_eq!(text("ABCDEFGHIJ", 4).unwrap(), "ABCD");
        assert!(text("NICOLÒ", 10).is_err());
    }

    #[test]
    fn fillers() {
        assert_eq!(blank(3), "   ");
        assert_eq!(zero_fill(4), "0000");
    }

    #[test]
    fn right_justify_and_slice() {
        assert_eq!(right_justify("CCSR/00123", 15).unwrap(), "00000CCSR/00123");
        assert!(right_justify("0123456789012345", 15).is_err());
        assert_eq!(slice("CCSR/00123", 4, 5).unwrap(), "/0012");
        assert_eq!(slice("2020/123", 4, 5).unwrap(), "0/123");
        assert_eq!(slice("AB", 4, 5).unwrap(), "00000");
    }
}
