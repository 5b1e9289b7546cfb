//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Reasons must contain something other than whitespace.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::new("reason_blank"));
    }
    if reason.len() > 500 {
        return Err(ValidationError::new("reason_too_long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_rejects_blank() {
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason("family matter").is_ok());
    }

    #[test]
    fn reason_rejects_overlong() {
        let long = "x".repeat(501);
        assert!(validate_reason(&long).is_err());
    }
}
