/// Why a request's API key was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiKeyError {
    #[error("missing bearer token")]
    Missing,
    #[error("Invalid API key")]
    Invalid,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Validates the provided key against the configured one.
///
/// The expected key is resolved once at startup and passed in; no environment lookups here.
pub fn validate_api_key(provided: Option<&str>, expected: &str) -> Result<(), ApiKeyError> {
    match provided {
        None => Err(ApiKeyError::Missing),
        Some(key) if key == expected => Ok(()),
        Some(_) => Err(ApiKeyError::Invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("bearer  abc123 "), Some("abc123"));
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[test]
    fn compares_against_expected_key() {
        assert_eq!(validate_api_key(Some("k"), "k"), Ok(()));
        assert_eq!(validate_api_key(Some("x"), "k"), Err(ApiKeyError::Invalid));
        assert_eq!(validate_api_key(None, "k"), Err(ApiKeyError::Missing));
    }
}
