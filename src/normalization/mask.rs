//! As-you-type phone mask for text inputs.
//!
//! Mirrors the browser-side helper used on intake forms: the field is
//! rewritten in place as `AAA-BBB-CCCC` as soon as a group boundary is
//! crossed.

/// Anything exposing a mutable string value, such as a form input.
pub trait TextField {
    fn value(&self) -> &str;
    fn set_value(&mut self, value: String);
}

impl TextField for String {
    fn value(&self) -> &str {
        self.as_str()
    }

    fn set_value(&mut self, value: String) {
        *self = value;
    }
}

/// Reformat the field's current value in place.
pub fn apply_phone_mask<F: TextField + ?Sized>(field: &mut F) {
    let masked = format_as_typed(field.value());
    if masked != field.value() {
        field.set_value(masked);
    }
}

/// Mask a partially typed number: digits only, at most ten, dashes after the
/// third and sixth digit once the next digit exists.
pub fn format_as_typed(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(10)
        .collect();

    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}
