//! Authentication utility functions.

use crate::errors::Error;

/// Validate an email address and lower-case its domain.
///
/// The local part keeps its casing; lookups are case-insensitive at the storage layer anyway.
pub fn normalize_email(raw: &str) -> Result<String, Error> {
    let email = raw.trim();
    let invalid = || Error::BadRequest {
        message: "Enter a valid email address".to_string(),
    };

    if email.is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }

    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || local.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    Ok(format!("{local}@{}", domain.to_lowercase()))
}

/// Pull the token out of an `Authorization` header value. `Bearer` and `Token` schemes are
/// accepted, case-insensitively.
pub fn parse_authorization(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    let known = scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token");
    (known && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("Test@Example.COM").unwrap(), "Test@example.com");
        assert_eq!(normalize_email("  cook@example.com ").unwrap(), "cook@example.com");
    }

    #[test]
    fn test_normalize_email_rejects_malformed() {
        for bad in ["", "   ", "no-at-sign", "@example.com", "cook@", "a@b@c.com", "co ok@example.com"] {
            assert!(
                matches!(normalize_email(bad), Err(Error::BadRequest { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_authorization() {
        assert_eq!(parse_authorization("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_authorization("bearer abc"), Some("abc"));
        assert_eq!(parse_authorization("Token abc"), Some("abc"));
        assert_eq!(parse_authorization("Basic abc"), None);
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization("abc"), None);
    }
}
