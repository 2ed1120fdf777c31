//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player name; anything longer is almost certainly noise.
const MAX_USERNAME_LENGTH: usize = 32;

/// Validates that a player name is non-empty (after trimming) and short
/// enough to display.
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("username_empty");
        err.message = Some("player name must not be empty".into());
        return Err(err);
    }

    if name.len() > MAX_USERNAME_LENGTH {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!(
                "player name must be at most {MAX_USERNAME_LENGTH} characters (got {})",
                name.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("player one").is_ok());
        assert!(validate_username("a").is_ok());
    }

    #[test]
    fn test_validate_username_empty() {
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("\t\n").is_err());
    }

    #[test]
    fn test_validate_username_too_long() {
        assert!(validate_username(&"x".repeat(33)).is_err());
        assert!(validate_username(&"x".repeat(32)).is_ok());
    }
}
