//! Boundary helper for callers extracting tokens from HTTP requests
//!
//! Kept free of any HTTP framework type: callers hand in the raw header
//! value and get the compact token back.

use crate::error::{Error, Result};

/// Strip the bearer scheme off an `Authorization` header value
///
/// The scheme is matched case-insensitively per the robustness principle;
/// anything without it is reported as carrying no token.
pub fn extract_bearer_token(authorization: &str) -> Result<&str> {
    const SCHEME: &str = "bearer ";
    match authorization.get(..SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => {
            let token = &authorization[SCHEME.len()..];
            if token.is_empty() {
                Err(Error::NoTokenInRequest)
            } else {
                Ok(token)
            }
        }
        _ => Err(Error::NoTokenInRequest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token("bearer tok").unwrap(), "tok");
        assert_eq!(extract_bearer_token("BEARER tok").unwrap(), "tok");
    }

    #[test]
    fn test_missing_or_other_scheme() {
        assert_eq!(extract_bearer_token(""), Err(Error::NoTokenInRequest));
        assert_eq!(extract_bearer_token("Basic dXNlcg=="), Err(Error::NoTokenInRequest));
        assert_eq!(extract_bearer_token("Bearer"), Err(Error::NoTokenInRequest));
        assert_eq!(extract_bearer_token("Bearer "), Err(Error::NoTokenInRequest));
    }
}
