use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Cookie value for a session id.
/// Format: session_id.hex(hmac_sha256(session_id))
pub fn sign_session_id(session_id: &str, secret: &str) -> Result<String, AppError> {
    let signature = create_hmac_signature(session_id, secret)?;
    Ok(format!("{}.{}", session_id, signature))
}

/// Verify a session cookie value and extract the session id.
pub fn verify_session_cookie(value: &str, secret: &str) -> Result<String, AppError> {
    let (session_id, cookie_signature) = value
        .rsplit_once('.')
        .ok_or_else(|| AppError::Unauthorized("Invalid session cookie structure".to_string()))?;

    if session_id.is_empty() {
        return Err(AppError::Unauthorized("Invalid session cookie structure".to_string()));
    }

    let expected_signature = create_hmac_signature(session_id, secret)?;

    if !bool::from(expected_signature.as_bytes().ct_eq(cookie_signature.as_bytes())) {
        return Err(AppError::Unauthorized("Invalid session cookie".to_string()));
    }

    Ok(session_id.to_string())
}

/// Create HMAC-SHA256 signature for the given data
fn create_hmac_signature(data: &str, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("HMAC initialization error: {}", e)))?;

    mac.update(data.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
