//! Signing methods
//!
//! Every supported algorithm implements [`SigningMethod`]; the registry
//! resolves the `alg` header string to a method instance. Unknown names
//! resolve to `None`, which parsers surface as an unverifiable token.

pub mod hmac;
pub mod rsa;

use crate::error::Result;
use crate::keys::{SigningKey, VerifyingKey};

/// An algorithm family member able to produce and check signatures over the
/// token signing input
pub trait SigningMethod: Send + Sync {
    /// The algorithm name as it appears in the `alg` header field
    fn alg(&self) -> &'static str;

    /// Sign `signing_input`, returning the Base64URL signature segment
    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String>;

    /// Check `signature` (a Base64URL segment) over `signing_input`
    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()>;
}

/// Resolve an algorithm name to its method
///
/// Callers must treat `None` as "this token cannot be verified", never as
/// permission to skip verification.
pub fn get_signing_method(alg: &str) -> Option<&'static dyn SigningMethod> {
    match alg {
        "RS256" => Some(&rsa::RS256),
        "RS384" => Some(&rsa::RS384),
        "RS512" => Some(&rsa::RS512),
        "HS256" => Some(&hmac::HS256),
        "HS384" => Some(&hmac::HS384),
        "HS512" => Some(&hmac::HS512),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_known_names() {
        for alg in ["RS256", "RS384", "RS512", "HS256", "HS384", "HS512"] {
            let method = get_signing_method(alg).expect(alg);
            assert_eq!(method.alg(), alg);
        }
    }

    #[test]
    fn test_registry_rejects_unknown_names() {
        assert!(get_signing_method("none").is_none());
        assert!(get_signing_method("ES256").is_none());
        assert!(get_signing_method("rs256").is_none());
        assert!(get_signing_method("").is_none());
    }
}
