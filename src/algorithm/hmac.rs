use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::keys::{SigningKey, VerifyingKey};
use crate::utils::base64url;

/// HS256 (HMAC with SHA-256)
pub struct MethodHs256;

/// HS384 (HMAC with SHA-384)
pub struct MethodHs384;

/// HS512 (HMAC with SHA-512)
pub struct MethodHs512;

/// HS256 method instance
pub static HS256: MethodHs256 = MethodHs256;

/// HS384 method instance
pub static HS384: MethodHs384 = MethodHs384;

/// HS512 method instance
pub static HS512: MethodHs512 = MethodHs512;

macro_rules! hmac_mac {
    ($digest:ty, $signing_input:expr, $secret:expr) => {{
        let mut mac = Hmac::<$digest>::new_from_slice($secret)
            .map_err(|e| Error::Signing(e.to_string()))?;
        mac.update($signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }};
}

impl SigningMethod for MethodHs256 {
    fn alg(&self) -> &'static str {
        "HS256"
    }

    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String> {
        let mac = hmac_mac!(Sha256, signing_input, key.as_hmac()?.as_bytes());
        Ok(base64url::encode_bytes(&mac))
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()> {
        let expected = hmac_mac!(Sha256, signing_input, key.as_hmac()?.as_bytes());
        check_mac(signature, &expected)
    }
}

impl SigningMethod for MethodHs384 {
    fn alg(&self) -> &'static str {
        "HS384"
    }

    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String> {
        let mac = hmac_mac!(Sha384, signing_input, key.as_hmac()?.as_bytes());
        Ok(base64url::encode_bytes(&mac))
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()> {
        let expected = hmac_mac!(Sha384, signing_input, key.as_hmac()?.as_bytes());
        check_mac(signature, &expected)
    }
}

impl SigningMethod for MethodHs512 {
    fn alg(&self) -> &'static str {
        "HS512"
    }

    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String> {
        let mac = hmac_mac!(Sha512, signing_input, key.as_hmac()?.as_bytes());
        Ok(base64url::encode_bytes(&mac))
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()> {
        let expected = hmac_mac!(Sha512, signing_input, key.as_hmac()?.as_bytes());
        check_mac(signature, &expected)
    }
}

/// Compare a provided Base64URL signature against the computed MAC in
/// constant time
fn check_mac(signature: &str, expected: &[u8]) -> Result<()> {
    let provided = base64url::decode_bytes(signature)?;
    if provided.len() != expected.len() {
        return Err(Error::SignatureInvalid);
    }
    if constant_time_eq(&provided, expected) {
        Ok(())
    } else {
        Err(Error::SignatureInvalid)
    }
}
