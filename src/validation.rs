//! Request body rules for sign-up and the cats resource.

use crate::error::AppError;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 30;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 20;
pub const CAT_MAX_AGE: i32 = 30;

/// Emails are compared case-insensitively, so they are stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(value: &str) -> Result<(), AppError> {
    let invalid = || AppError::Validation("email must be an email".into());

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return Err(invalid());
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(invalid());
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    // Domain needs at least one dot and no empty labels
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || domain.len() > 255 {
        return Err(invalid());
    }
    for label in labels {
        if label.is_empty()
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(invalid());
        }
    }
    Ok(())
}

/// 8-20 characters with an upper-case letter, a lower-case letter and a digit or symbol.
pub fn validate_password(value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < PASSWORD_MIN_CHARS {
        return Err(AppError::Validation(format!(
            "password must be longer than or equal to {} characters",
            PASSWORD_MIN_CHARS
        )));
    }
    if len > PASSWORD_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "password must be shorter than or equal to {} characters",
            PASSWORD_MAX_CHARS
        )));
    }

    let has_upper = value.chars().any(char::is_uppercase);
    let has_lower = value.chars().any(char::is_lowercase);
    let has_digit_or_symbol = value
        .chars()
        .any(|c| c.is_ascii_digit() || !(c.is_alphanumeric() || c == '_'));

    if has_upper && has_lower && has_digit_or_symbol {
        Ok(())
    } else {
        Err(AppError::Validation("Password is too weak".into()))
    }
}

pub fn validate_name(value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(AppError::Validation(format!(
            "name must be between {} and {} characters",
            NAME_MIN_CHARS, NAME_MAX_CHARS
        )));
    }
    Ok(())
}

pub fn validate_not_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} should not be empty", field)));
    }
    Ok(())
}

pub fn validate_cat_age(age: i32) -> Result<(), AppError> {
    if !(0..=CAT_MAX_AGE).contains(&age) {
        return Err(AppError::Validation(format!(
            "age must be between 0 and {}",
            CAT_MAX_AGE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());

        for bad in ["", "ax.com", "a@x", "a@@x.com", "@x.com", "a@.com", "a b@x.com", ".a@x.com", "a@x..com"] {
            assert!(validate_email(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert!(validate_password("Password!").is_ok());
        assert!(validate_password("Password1").is_ok());

        assert!(validate_password("Pa1!").is_err());
        assert!(validate_password("Passw0rd!Passw0rd!Pass").is_err());
        assert!(validate_password("password1").is_err());
        assert!(validate_password("PASSWORD1").is_err());
        match validate_password("Password") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Password is too weak"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_name_length_counts_chars() {
        assert!(validate_name("A").is_err());
        assert!(validate_name("Al").is_ok());
        assert!(validate_name(&"é".repeat(30)).is_ok());
        assert!(validate_name(&"x".repeat(31)).is_err());
    }

    #[test]
    fn test_cat_rules() {
        assert!(validate_cat_age(0).is_ok());
        assert!(validate_cat_age(30).is_ok());
        assert!(validate_cat_age(-1).is_err());
        assert!(validate_cat_age(31).is_err());
        assert!(validate_not_blank("breed", "  ").is_err());
        assert!(validate_not_blank("breed", "Siamese").is_ok());
    }
}
