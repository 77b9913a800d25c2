//! Cameroon phone number validation and normalization.
//!
//! Accepted input forms (whitespace ignored): `+237XXXXXXXXX`,
//! `237XXXXXXXXX`, or the bare 9-digit national number starting with
//! `2` or `6`. Storage always uses the canonical `+237XXXXXXXXX` form,
//! so duplicate detection is insensitive to how the number was entered.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, CoreResult};

/// Pattern for a Cameroon number with optional `+237`/`237` prefix.
pub const PHONE_PATTERN: &str = r"^(\+?237)?[26]\d{8}$";

/// Compiled phone regex. Compiled once, reused forever.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

/// Validate a raw phone number and return its normalized `+237…` form.
pub fn validate_phone(raw: &str) -> CoreResult<String> {
    if raw.trim().is_empty() {
        return Err(CoreError::Validation("Phone number is required".to_string()));
    }

    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if !PHONE_RE.is_match(&cleaned) {
        return Err(CoreError::Validation(
            "Invalid phone number format. Use: +237XXXXXXXXX, 237XXXXXXXXX, or 6/2XXXXXXXX"
                .to_string(),
        ));
    }

    Ok(normalize(&cleaned))
}

/// Normalize an already-validated, whitespace-free number to `+237…`.
fn normalize(cleaned: &str) -> String {
    if let Some(rest) = cleaned.strip_prefix("+237") {
        format!("+237{rest}")
    } else if let Some(rest) = cleaned.strip_prefix("237") {
        format!("+237{rest}")
    } else {
        format!("+237{cleaned}")
    }
}
