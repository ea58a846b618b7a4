//! Customer display names (ragione sociale) for private patients.

use deunicode::deunicode;

/// Maximum number of given names carried into the display name.
const GIVEN_NAMES_KEPT: usize = 2;

/// Display name built from surname and given names, transliterated to ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerName {
    /// `"SURNAME Given1 Given2"`.
    pub display: String,
    /// Length of the surname plus one.
    pub split_index: usize,
}

impl CustomerName {
    /// Build the display name from the surname and the full given name.
    ///
    /// Only the first two whitespace-separated given names are kept.
    /// The split index is measured on the transliterated surname so it
    /// always points at the boundary inside `display`.
    pub fn new(surname: &str, given_name: &str) -> Self {
        let surname = deunicode(surname.trim());
        let given: Vec<&str> = given_name
            .split_whitespace()
            .take(GIVEN_NAMES_KEPT)
            .collect();
        let given = deunicode(&given.join(" "));
        Self {
            split_index: surname.len() + 1,
            display: format!("{surname} {given}"),
        }
    }
}
