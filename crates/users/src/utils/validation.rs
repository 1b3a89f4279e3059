//! Input validation utilities.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::types::{UserError, UserResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("username regex is valid"));

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_BIO_LEN: usize = 500;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> UserResult<()> {
    if email.len() > 255 {
        return Err(UserError::validation("Email too long"));
    }

    if !EMAIL_RE.is_match(email) {
        return Err(UserError::validation("Invalid email format"));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> UserResult<()> {
    let length = username.chars().count();
    if length < 3 {
        return Err(UserError::validation("Username must be at least 3 characters long"));
    }

    if length > 30 {
        return Err(UserError::validation("Username must be at most 30 characters long"));
    }

    if !USERNAME_RE.is_match(username) {
        return Err(UserError::validation(
            "Username can only contain letters, numbers, underscores, and hyphens",
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> UserResult<()> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LEN {
        return Err(UserError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    if length > MAX_PASSWORD_LEN {
        return Err(UserError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters long"
        )));
    }

    Ok(())
}

pub fn validate_bio(bio: &str) -> UserResult<()> {
    if bio.chars().count() > MAX_BIO_LEN {
        return Err(UserError::validation(format!(
            "Bio must be at most {MAX_BIO_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn validate_profile_picture(url: &str) -> UserResult<()> {
    if url.len() > 2048 {
        return Err(UserError::validation("Profile picture URL too long"));
    }

    let parsed = Url::parse(url)
        .map_err(|_| UserError::validation("Profile picture must be an http(s) URL"))?;

    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    if !matches!(parsed.scheme(), "http" | "https") || !has_host {
        return Err(UserError::validation("Profile picture must be an http(s) URL"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name+tag@domain.co.uk").is_ok());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("test@").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("validuser").is_ok());
        assert!(validate_username("user_123").is_ok());
        assert!(validate_username("user-name").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("user@name").is_err());
        assert!(validate_username("user name").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_profile_picture() {
        assert!(validate_profile_picture("https://cdn.example.com/me.png").is_ok());
        assert!(validate_profile_picture("http://localhost:3000/me.png").is_ok());
        assert!(validate_profile_picture("javascript:alert(1)").is_err());
        assert!(validate_profile_picture("https://").is_err());
        assert!(validate_profile_picture("https://a b.com").is_err());
        assert!(validate_profile_picture("ftp://files.example.com/me.png").is_err());
    }

    #[test]
    fn test_validate_profile_picture_rejects_unparseable_urls() {
        for url in [
            "http://[",
            "https://:80",
            "https://?x",
            "http://#frag",
            "https://a..b<>",
        ] {
            assert!(validate_profile_picture(url).is_err(), "accepted {url}");
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Foo@Bar.COM "), "foo@bar.com");
    }
}
