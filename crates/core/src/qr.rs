//! QR code generation for offline farmer identification.
//!
//! Codes are `QR-` followed by eight uppercase hex characters drawn from
//! a fresh UUID. Uniqueness is enforced against the database by the
//! caller, which retries up to [`MAX_QR_ATTEMPTS`] times and fails with
//! an internal error when the namespace is exhausted.

use uuid::Uuid;

/// Prefix of every generated code.
pub const QR_PREFIX: &str = "QR-";

/// Upper bound on collision retries before the caller gives up.
pub const MAX_QR_ATTEMPTS: u32 = 5;

/// Generate one candidate QR code.
pub fn generate_qr_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{QR_PREFIX}{}", uuid[..8].to_uppercase())
}
