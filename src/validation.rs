//! Validation and normalization of order fields.
//!
//! Malformed input is an expected outcome here, not an error: every function
//! returns the normalized value or a caller-facing rejection reason. The
//! reasons are surfaced verbatim as the `detail` of a rejected order.

use std::sync::OnceLock;

use phonenumber::Mode;
use regex::Regex;

/// Digit-count bounds for phone numbers, inclusive.
const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOrder {
    pub user_name: String,
    pub phone_number: String,
}

fn user_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\p{L}' -]+$").expect("invalid user name pattern"))
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9()\- ]+$").expect("invalid phone pattern"))
}

/// Collapse internal whitespace runs to a single space and trim the ends.
fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate a user name, returning its normalized form.
///
/// Letters (any script), spaces, apostrophes, and hyphens are accepted.
pub fn validate_user_name(raw: &str) -> Result<String, String> {
    let normalized = collapse_whitespace(raw);
    if !user_name_pattern().is_match(&normalized) {
        return Err("User name contains invalid characters".to_string());
    }
    Ok(normalized)
}

/// Validate a phone number, returning its E.164 canonical form.
pub fn validate_phone_number(raw: &str) -> Result<String, String> {
    let normalized = collapse_whitespace(raw);
    if !phone_pattern().is_match(&normalized) {
        return Err("Phone number contains invalid characters".to_string());
    }

    let digit_count = normalized.chars().filter(char::is_ascii_digit).count();
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digit_count) {
        return Err(format!(
            "Phone number must contain {} to {} digits",
            PHONE_MIN_DIGITS, PHONE_MAX_DIGITS
        ));
    }

    let candidate = if normalized.starts_with('+') {
        normalized
    } else {
        format!("+{normalized}")
    };

    let parsed = phonenumber::parse(None, &candidate)
        .map_err(|e| format!("Invalid phone number format: {e}"))?;
    if !phonenumber::is_valid(&parsed) {
        return Err("Phone number is not valid".to_string());
    }

    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Run the full pipeline: name first, then phone, short-circuiting on the
/// first failure.
pub fn validate_order(user_name: &str, phone_number: &str) -> Result<NormalizedOrder, String> {
    let user_name = validate_user_name(user_name)?;
    let phone_number = validate_phone_number(phone_number)?;
    Ok(NormalizedOrder {
        user_name,
        phone_number,
    })
}
