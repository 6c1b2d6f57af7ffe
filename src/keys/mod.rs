/// Key material for signing and verification
///
/// Keys are closed enums over the supported families so a method can insist
/// on the right shape: HMAC methods take a shared secret on both sides,
/// RSA methods take a private key to sign and a public key to verify.
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{Error, Result};

/// A key that can produce signatures
#[derive(Clone)]
pub enum SigningKey {
    /// Shared secret for the HMAC family
    Hmac(SymmetricKey),

    /// RSA private key for the RSA family
    Rsa(Box<RsaPrivateKey>),
}

impl SigningKey {
    /// Wrap a shared secret
    pub fn hmac(secret: impl Into<SymmetricKey>) -> Self {
        SigningKey::Hmac(secret.into())
    }

    /// Wrap an RSA private key
    pub fn rsa(key: RsaPrivateKey) -> Self {
        SigningKey::Rsa(Box::new(key))
    }

    /// Key family name for error messages
    pub fn key_type(&self) -> &'static str {
        match self {
            SigningKey::Hmac(_) => "symmetric",
            SigningKey::Rsa(_) => "RSA private",
        }
    }

    /// The shared secret, or a key-type-mismatch error
    pub fn as_hmac(&self) -> Result<&SymmetricKey> {
        match self {
            SigningKey::Hmac(key) => Ok(key),
            _ => Err(Error::KeyTypeMismatch {
                algorithm: "HMAC".to_string(),
                expected: "symmetric".to_string(),
                actual: self.key_type().to_string(),
            }),
        }
    }

    /// The RSA private key, or a key-type-mismatch error
    pub fn as_rsa(&self) -> Result<&RsaPrivateKey> {
        match self {
            SigningKey::Rsa(key) => Ok(key),
            _ => Err(Error::KeyTypeMismatch {
                algorithm: "RSA".to_string(),
                expected: "RSA private".to_string(),
                actual: self.key_type().to_string(),
            }),
        }
    }
}

/// A key that can check signatures
#[derive(Clone)]
pub enum VerifyingKey {
    /// Shared secret for the HMAC family
    Hmac(SymmetricKey),

    /// RSA public key for the RSA family
    Rsa(Box<RsaPublicKey>),
}

impl VerifyingKey {
    /// Wrap a shared secret
    pub fn hmac(secret: impl Into<SymmetricKey>) -> Self {
        VerifyingKey::Hmac(secret.into())
    }

    /// Wrap an RSA public key
    pub fn rsa(key: RsaPublicKey) -> Self {
        VerifyingKey::Rsa(Box::new(key))
    }

    /// Key family name for error messages
    pub fn key_type(&self) -> &'static str {
        match self {
            VerifyingKey::Hmac(_) => "symmetric",
            VerifyingKey::Rsa(_) => "RSA public",
        }
    }

    /// The shared secret, or a key-type-mismatch error
    pub fn as_hmac(&self) -> Result<&SymmetricKey> {
        match self {
            VerifyingKey::Hmac(key) => Ok(key),
            _ => Err(Error::KeyTypeMismatch {
                algorithm: "HMAC".to_string(),
                expected: "symmetric".to_string(),
                actual: self.key_type().to_string(),
            }),
        }
    }

    /// The RSA public key, or a key-type-mismatch error
    pub fn as_rsa(&self) -> Result<&RsaPublicKey> {
        match self {
            VerifyingKey::Rsa(key) => Ok(key),
            _ => Err(Error::KeyTypeMismatch {
                algorithm: "RSA".to_string(),
                expected: "RSA public".to_string(),
                actual: self.key_type().to_string(),
            }),
        }
    }
}

/// A shared secret for the HMAC family
#[derive(Clone)]
pub struct SymmetricKey {
    secret: Vec<u8>,
}

impl SymmetricKey {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl From<Vec<u8>> for SymmetricKey {
    fn from(secret: Vec<u8>) -> Self {
        Self::new(secret)
    }
}

impl From<&[u8]> for SymmetricKey {
    fn from(secret: &[u8]) -> Self {
        Self::new(secret.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for SymmetricKey {
    fn from(secret: &[u8; N]) -> Self {
        Self::new(secret.to_vec())
    }
}

impl From<String> for SymmetricKey {
    fn from(secret: String) -> Self {
        Self::new(secret.into_bytes())
    }
}

impl From<&str> for SymmetricKey {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_key_conversions() {
        assert_eq!(SymmetricKey::from("secret").as_bytes(), b"secret");
        assert_eq!(SymmetricKey::from("secret".to_string()).as_bytes(), b"secret");
        assert_eq!(SymmetricKey::from(vec![1, 2, 3]).as_bytes(), &[1, 2, 3]);
        assert_eq!(SymmetricKey::from(b"raw").as_bytes(), b"raw");
    }

    #[test]
    fn test_key_type_checking() {
        let signing = SigningKey::hmac("secret");
        assert!(signing.as_hmac().is_ok());
        assert!(matches!(
            signing.as_rsa(),
            Err(Error::KeyTypeMismatch { .. })
        ));

        let verifying = VerifyingKey::hmac("secret");
        assert!(verifying.as_hmac().is_ok());
        assert!(matches!(
            verifying.as_rsa(),
            Err(Error::KeyTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_key_type_names() {
        assert_eq!(SigningKey::hmac("s").key_type(), "symmetric");
        assert_eq!(VerifyingKey::hmac("s").key_type(), "symmetric");
    }
}
