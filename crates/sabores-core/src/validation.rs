//! # Validation Module
//!
//! Field-level validators for the checkout forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Checkout form (UI)                                           │
//! │  └── Immediate per-field feedback                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CheckoutFlow::advance / begin_submit                         │
//! │  └── THIS MODULE: blocks the transition, returns ValidationError       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Stock, auth, prices (authoritative)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sabores_core::validation::{validate_email, validate_rut};
//!
//! assert!(validate_email("ana@mail.cl").is_ok());
//! assert!(validate_rut("12.345.678-5").is_ok());
//! assert!(validate_rut("12.345.678-9").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest buyer name accepted.
pub const MAX_NAME_LEN: usize = 120;

/// Longest delivery address accepted.
pub const MAX_ADDRESS_LEN: usize = 250;

/// Longest buyer note accepted.
pub const MAX_NOTES_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field and returns it trimmed.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a buyer name.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    validate_required("name", name, MAX_NAME_LEN)
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Exactly one `@`, non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required("email", email, 254)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing @"))?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain.cl"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must look like domain.cl"));
    }

    Ok(email)
}

/// Validates an optional phone number.
///
/// Empty input is `Ok(None)`. Otherwise 8 to 15 digits, ignoring spaces,
/// dashes and a leading `+`.
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) || !(8..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 8 and 15 digits".to_string(),
        });
    }

    Ok(Some(phone.to_string()))
}

/// Validates a delivery address (required for home delivery).
pub fn validate_address(address: Option<&str>) -> ValidationResult<String> {
    validate_required("address", address.unwrap_or_default(), MAX_ADDRESS_LEN)
}

/// Validates optional buyer notes, returning `None` for blank input.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// RUT
// =============================================================================

/// Validates a Chilean RUT and returns it in canonical `12.345.678-5` form.
///
/// ## Check Digit (modulo 11)
/// ```text
/// body digits, right to left, times 2,3,4,5,6,7,2,3,...
///   sum → 11 - (sum mod 11)
///   11 → '0'    10 → 'K'    n → n
/// ```
///
/// Accepts `12.345.678-5`, `12345678-5` and `123456785`; `k` is case-insensitive.
pub fn validate_rut(rut: &str) -> ValidationResult<String> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "rut".to_string(),
        reason: reason.to_string(),
    };

    let compact: String = rut
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .collect::<String>()
        .to_uppercase();

    if compact.is_empty() {
        return Err(ValidationError::Required {
            field: "rut".to_string(),
        });
    }

    if compact.len() < 2 || compact.len() > 9 {
        return Err(invalid("must have between 1 and 8 digits plus a check digit"));
    }

    let (body, check) = compact.split_at(compact.len() - 1);
    if !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("body must be numeric"));
    }

    let expected = rut_check_digit(body);
    if check.chars().next() != Some(expected) {
        return Err(invalid("check digit does not match"));
    }

    Ok(format!("{}-{}", group_thousands(body), expected))
}

/// Computes the modulo-11 check digit for a numeric RUT body.
pub fn rut_check_digit(body: &str) -> char {
    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .zip([2, 3, 4, 5, 6, 7].iter().cycle())
        .map(|(digit, factor)| digit * factor)
        .sum();

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        n => char::from_digit(n, 10).unwrap_or('0'),
    }
}

fn group_thousands(digits: &str) -> String {
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tendered cash amount.
///
/// ## Rules
/// - Must be present for cash payments
/// - Must be non-negative
pub fn validate_tendered(tendered: Option<i64>) -> ValidationResult<i64> {
    match tendered {
        None => Err(ValidationError::Required {
            field: "tendered".to_string(),
        }),
        Some(amount) if amount < 0 => Err(ValidationError::OutOfRange {
            field: "tendered".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        Some(amount) => Ok(amount),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ana Pérez ").unwrap(), "Ana Pérez");
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@mail.cl").is_ok());
        assert!(validate_email("ana.perez@duoc.uc.cl").is_ok());

        assert!(matches!(validate_email(""), Err(ValidationError::Required { .. })));
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@mail.cl").is_err());
        assert!(validate_email("ana@mail").is_err());
        assert!(validate_email("ana @mail.cl").is_err());
        assert!(validate_email("ana@@mail.cl").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("  ")).unwrap(), None);
        assert!(validate_phone(Some("+56 9 1234 5678")).unwrap().is_some());
        assert!(validate_phone(Some("1234")).is_err());
        assert!(validate_phone(Some("9-ABC-5678")).is_err());
    }

    #[test]
    fn test_validate_rut() {
        assert_eq!(validate_rut("12345678-5").unwrap(), "12.345.678-5");
        assert_eq!(validate_rut("12.345.678-5").unwrap(), "12.345.678-5");
        assert_eq!(validate_rut("11.111.111-1").unwrap(), "11.111.111-1");
        assert_eq!(validate_rut("76000000-0").unwrap(), "76.000.000-0");
        assert_eq!(validate_rut("6-k").unwrap(), "6-K");

        assert!(validate_rut("12.345.678-9").is_err());
        assert!(validate_rut("ABC").is_err());
        assert!(matches!(validate_rut(""), Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_rut_check_digit() {
        assert_eq!(rut_check_digit("12345678"), '5');
        assert_eq!(rut_check_digit("6"), 'K');
        assert_eq!(rut_check_digit("76000000"), '0');
    }

    #[test]
    fn test_validate_address_and_notes() {
        assert!(validate_address(None).is_err());
        assert!(validate_address(Some("   ")).is_err());
        assert_eq!(validate_address(Some(" Av. Siempre Viva 742 ")).unwrap(), "Av. Siempre Viva 742");

        assert_eq!(validate_notes(Some("  ")).unwrap(), None);
        assert_eq!(validate_notes(Some("Sin nueces")).unwrap().as_deref(), Some("Sin nueces"));
        assert!(validate_notes(Some(&"x".repeat(600))).is_err());
    }

    #[test]
    fn test_validate_tendered() {
        assert_eq!(validate_tendered(Some(5000)).unwrap(), 5000);
        assert_eq!(validate_tendered(Some(0)).unwrap(), 0);
        assert!(validate_tendered(Some(-1)).is_err());
        assert_eq!(validate_tendered(None).unwrap_err().field(), "tendered");
    }
}
