//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted session identity.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Validates a browser session identity: 1 to 128 characters drawn from
/// ASCII letters, digits, `-`, `_` and `.`.
///
/// ```ignore
/// validate_session_id("session_1700000000_ab12cd") // Ok
/// validate_session_id("")                          // Err - missing
/// validate_session_id("has space")                 // Err - format
/// ```
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        let mut err = ValidationError::new("session_id_missing");
        err.message = Some("missing session id".into());
        return Err(err);
    }

    if id.len() > MAX_SESSION_ID_LEN {
        let mut err = ValidationError::new("session_id_length");
        err.message = Some(
            format!(
                "session id must be at most {MAX_SESSION_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        let mut err = ValidationError::new("session_id_format");
        err.message = Some("session id contains unsupported characters".into());
        return Err(err);
    }

    Ok(())
}
