//! Input validation helpers
//!
//! Centralized text length constants and field-format validation functions.
//! Formats follow the Mexican conventions the product targets: 5-digit
//! postal codes, RFC tax ids, 10-digit phone numbers with optional +52 prefix.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Listing titles
pub const MAX_TITLE_LEN: usize = 160;

/// Descriptions and other free text
pub const MAX_DESCRIPTION_LEN: usize = 4000;

/// Street, neighborhood, city, state
pub const MAX_ADDRESS_PART_LEN: usize = 120;

/// House number (interior, "s/n", etc.)
pub const MAX_HOUSE_NUMBER_LEN: usize = 20;

/// Usernames and person names
pub const MAX_NAME_LEN: usize = 150;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Stored image file names / urls
pub const MAX_IMAGE_LEN: usize = 2048;

// ── Generic helpers ─────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

// ── Field formats ───────────────────────────────────────────────────

/// Postal code: exactly 5 ASCII digits.
pub fn validate_postal_code(value: &str) -> Result<(), AppError> {
    if value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }
    Err(AppError::validation(
        "Postal code must be exactly 5 digits".to_string(),
    ))
}

/// RFC tax id: 3 letters (person moral) or 4 letters (person fisica),
/// 6 digits of birth/incorporation date, 3 alphanumeric homoclave chars.
/// Uppercase only; Ñ and & count as letters.
pub fn is_valid_tax_id(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    let (letters, rest) = match chars.len() {
        12 => (3, &chars[3..]),
        13 => (4, &chars[4..]),
        _ => return false,
    };
    let is_rfc_letter = |c: char| c.is_ascii_uppercase() || c == 'Ñ' || c == '&';
    if !chars[..letters].iter().copied().all(is_rfc_letter) {
        return false;
    }
    if !rest[..6].iter().all(|c| c.is_ascii_digit()) {
        return false;
    }
    rest[6..]
        .iter()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Validate an RFC, producing the user-facing error message.
pub fn validate_tax_id(value: &str) -> Result<(), AppError> {
    if is_valid_tax_id(value) {
        return Ok(());
    }
    Err(AppError::validation(
        "Invalid RFC. Person example: GODE561231GR8 / company: ABC001231AB1 (use UPPERCASE)"
            .to_string(),
    ))
}

/// Phone number: 10 digits, optionally prefixed with +52 / 52 and a
/// mobile "1" (e.g. 6561234567 or +5216561234567).
pub fn is_valid_phone(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let rest = digits.strip_prefix("52").unwrap_or(digits);
    let rest = if rest.len() == 11 {
        rest.strip_prefix('1').unwrap_or(rest)
    } else {
        rest
    };
    rest.len() == 10
}

/// Validate a contact number, producing the user-facing error message.
pub fn validate_phone(value: &str) -> Result<(), AppError> {
    if is_valid_phone(value) {
        return Ok(());
    }
    Err(AppError::validation(
        "Invalid number. Use 10 digits (e.g. 6561234567) or +5216561234567".to_string(),
    ))
}

/// Coordinate ranges: latitude [-90, 90], longitude [-180, 180].
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::validation(format!(
            "Latitude {latitude} out of range [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::validation(format!(
            "Longitude {longitude} out of range [-180, 180]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_must_be_five_digits() {
        assert!(validate_postal_code("31000").is_ok());
        assert!(validate_postal_code("3100").is_err());
        assert!(validate_postal_code("310000").is_err());
        assert!(validate_postal_code("31o00").is_err());
        assert!(validate_postal_code("").is_err());
    }

    #[test]
    fn tax_id_person_and_company_formats() {
        assert!(is_valid_tax_id("GODE561231GR8"));
        assert!(is_valid_tax_id("ABC001231AB1"));
        assert!(is_valid_tax_id("ÑAND561231GR8"));
        assert!(!is_valid_tax_id("gode561231gr8")); // lowercase rejected
        assert!(!is_valid_tax_id("GODE56123GR8")); // short date
        assert!(!is_valid_tax_id("GODE561231GR"));
    }

    #[test]
    fn phone_formats() {
        assert!(is_valid_phone("6561234567"));
        assert!(is_valid_phone("+5216561234567"));
        assert!(is_valid_phone("5216561234567"));
        assert!(is_valid_phone("526561234567"));
        assert!(!is_valid_phone("123456"));
        assert!(!is_valid_phone("65612345678901"));
        assert!(!is_valid_phone("656123456a"));
    }

    #[test]
    fn coordinate_ranges() {
        assert!(validate_coordinates(28.63, -106.07).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
    }
}
