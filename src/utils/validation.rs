use crate::error::{AppError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Username format: 3-30 characters, letters/digits/underscore/hyphen.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username cannot be empty".to_string()));
    }

    if username.len() < 3 {
        return Err(AppError::Validation("Username must be at least 3 characters".to_string()));
    }

    if username.len() > 30 {
        return Err(AppError::Validation("Username cannot exceed 30 characters".to_string()));
    }

    static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
    let pattern = USERNAME_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
    if !pattern.is_match(username) {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, underscores and hyphens".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email_format(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email cannot be empty".to_string()));
    }

    if !validator::validate_email(email) {
        return Err(AppError::Validation("Email format is invalid".to_string()));
    }

    if email.len() > 254 {
        return Err(AppError::Validation("Email address is too long".to_string()));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation("Password must be at least 8 characters".to_string()));
    }

    if password.len() > 128 {
        return Err(AppError::Validation("Password cannot exceed 128 characters".to_string()));
    }

    Ok(())
}

/// Tweet content must be non-empty and within the character limit. The
/// limit counts characters, not bytes.
pub fn validate_tweet_content(content: &str, max_length: usize) -> Result<()> {
    if content.is_empty() {
        return Err(AppError::Validation("Content cannot be empty".to_string()));
    }

    let length = content.chars().count();
    if length > max_length {
        return Err(AppError::Validation(format!(
            "Content cannot exceed {} characters (got {})",
            max_length, length
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("user_123").is_ok());
        assert!(validate_username("a-b-c").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("with space").is_err());
        assert!(validate_username("with@symbol").is_err());
    }

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("user@example.com").is_ok());
        assert!(validate_email_format("test.email+tag@domain.co.uk").is_ok());

        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("invalid-email").is_err());
        assert!(validate_email_format("@domain.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());

        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_tweet_content() {
        assert!(validate_tweet_content("hello", 140).is_ok());
        assert!(validate_tweet_content(&"a".repeat(140), 140).is_ok());
        assert!(validate_tweet_content(&"あ".repeat(140), 140).is_ok());

        assert!(validate_tweet_content("", 140).is_err());
        assert!(validate_tweet_content(&"a".repeat(141), 140).is_err());
    }
}
