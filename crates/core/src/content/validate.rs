//! Boundary validation for content inputs.
//!
//! Shape errors (unknown fields, wrong types, missing required keys) are
//! caught by serde before these checks run.
use thiserror::Error;

/// Smallest accepted base font size.
pub const MIN_FONT_SIZE: i32 = 8;
/// Largest accepted base font size.
pub const MAX_FONT_SIZE: i32 = 48;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{0} cannot be negative")]
    Negative(&'static str),
    #[error("invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),
    #[error("font size {0} is outside {MIN_FONT_SIZE}..={MAX_FONT_SIZE}")]
    FontSizeOutOfRange(i32),
    #[error("unknown investment type {0:?}")]
    UnknownKind(String),
    #[error("unknown bucket {0:?}")]
    UnknownBucket(String),
    #[error("file content is not valid base64")]
    InvalidBase64,
    #[error("file is empty")]
    EmptyFile,
    #[error("file is too large: {size} bytes (max {max})")]
    FileTooLarge { size: usize, max: usize },
}

/// Checks that run on a decoded input before it reaches the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Reject blank required text.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}

/// Reject blank text when the field is present at all.
pub fn require_text_if_set(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(value) => require_text(field, value),
        None => Ok(()),
    }
}

/// Reject negative counts and amounts.
pub fn non_negative<T>(field: &'static str, value: Option<T>) -> Result<(), ValidationError>
where
    T: Into<i64>,
{
    match value.map(Into::into) {
        Some(n) if n < 0 => Err(ValidationError::Negative(field)),
        _ => Ok(()),
    }
}

/// Accept `#RRGGBB` only.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ValidationError::InvalidColor(value.to_string()));
    }
    Ok(())
}

pub fn validate_font_size(value: i32) -> Result<(), ValidationError> {
    if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&value) {
        return Err(ValidationError::FontSizeOutOfRange(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(require_text("titulo", "   "), Err(ValidationError::Empty("titulo")));
        assert!(require_text("titulo", "Casa X").is_ok());
        assert!(require_text_if_set("titulo", None).is_ok());
        assert!(require_text_if_set("titulo", Some("")).is_err());
    }

    #[test]
    fn negative_numbers_are_rejected() {
        assert_eq!(non_negative("price", Some(-1i64)), Err(ValidationError::Negative("price")));
        assert!(non_negative("bedrooms", Some(0i32)).is_ok());
        assert!(non_negative::<i32>("bedrooms", None).is_ok());
    }

    #[test]
    fn hex_colors() {
        assert!(validate_hex_color("#1E40AF").is_ok());
        assert!(validate_hex_color("#abcdef").is_ok());
        assert!(validate_hex_color("1E40AF").is_err());
        assert!(validate_hex_color("#1E40A").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn font_size_bounds() {
        assert!(validate_font_size(16).is_ok());
        assert!(validate_font_size(MIN_FONT_SIZE).is_ok());
        assert!(validate_font_size(MAX_FONT_SIZE + 1).is_err());
    }
}
