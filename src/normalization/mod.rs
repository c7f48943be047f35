//! Phone number normalization.
//!
//! Numbers are US-centric: after stripping formatting, an 11-digit number
//! with a leading `1` loses the country code, and a 10-digit number is
//! rendered as `(AAA) BBB-CCCC`. Anything else is returned as bare digits.

pub mod mask;

pub use mask::{TextField, apply_phone_mask, format_as_typed};

/// Keeps only the ASCII digits of `raw`.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a raw phone string to the canonical display form.
///
/// Never fails: input that does not reduce to 10 digits comes back as its
/// digit-stripped form, which later simply misses every source lookup.
pub fn normalize_phone(raw: &str) -> String {
    let mut digits = digits_only(raw);

    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }

    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
    } else {
        digits
    }
}
