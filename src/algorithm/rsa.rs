use rsa::pkcs1v15::{Signature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey};
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{SignatureEncoding, Signer, Verifier};

use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::keys::{SigningKey, VerifyingKey};
use crate::utils::base64url;

/// RS256 (RSASSA-PKCS1-v1_5 with SHA-256)
pub struct MethodRs256;

/// RS384 (RSASSA-PKCS1-v1_5 with SHA-384)
pub struct MethodRs384;

/// RS512 (RSASSA-PKCS1-v1_5 with SHA-512)
pub struct MethodRs512;

/// RS256 method instance
pub static RS256: MethodRs256 = MethodRs256;

/// RS384 method instance
pub static RS384: MethodRs384 = MethodRs384;

/// RS512 method instance
pub static RS512: MethodRs512 = MethodRs512;

impl SigningMethod for MethodRs256 {
    fn alg(&self) -> &'static str {
        "RS256"
    }

    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String> {
        let signer = RsaSigningKey::<Sha256>::new(key.as_rsa()?.clone());
        sign_rsa(signing_input, &signer)
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()> {
        verify_rsa(
            signing_input,
            signature,
            &RsaVerifyingKey::<Sha256>::new(key.as_rsa()?.clone()),
        )
    }
}

impl SigningMethod for MethodRs384 {
    fn alg(&self) -> &'static str {
        "RS384"
    }

    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String> {
        let signer = RsaSigningKey::<Sha384>::new(key.as_rsa()?.clone());
        sign_rsa(signing_input, &signer)
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()> {
        verify_rsa(
            signing_input,
            signature,
            &RsaVerifyingKey::<Sha384>::new(key.as_rsa()?.clone()),
        )
    }
}

impl SigningMethod for MethodRs512 {
    fn alg(&self) -> &'static str {
        "RS512"
    }

    fn sign(&self, signing_input: &str, key: &SigningKey) -> Result<String> {
        let signer = RsaSigningKey::<Sha512>::new(key.as_rsa()?.clone());
        sign_rsa(signing_input, &signer)
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &VerifyingKey) -> Result<()> {
        verify_rsa(
            signing_input,
            signature,
            &RsaVerifyingKey::<Sha512>::new(key.as_rsa()?.clone()),
        )
    }
}

fn sign_rsa<S>(signing_input: &str, signer: &S) -> Result<String>
where
    S: Signer<Signature>,
{
    let signature = signer
        .try_sign(signing_input.as_bytes())
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok(base64url::encode_bytes(&signature.to_bytes()))
}

fn verify_rsa<V>(signing_input: &str, signature: &str, verifier: &V) -> Result<()>
where
    V: Verifier<Signature>,
{
    let signature_bytes = base64url::decode_bytes(signature)?;
    let signature =
        Signature::try_from(signature_bytes.as_slice()).map_err(|_| Error::SignatureInvalid)?;
    verifier
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|_| Error::SignatureInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys;

    #[test]
    fn test_rs256_sign_verify_roundtrip() {
        let (private_key, public_key) = test_keys::rsa_key_pair();
        let signing_input = "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9.eyJmb28iOiJiYXIifQ";

        let signature = RS256
            .sign(signing_input, &SigningKey::rsa(private_key.clone()))
            .unwrap();
        assert!(RS256
            .verify(
                signing_input,
                &signature,
                &VerifyingKey::rsa(public_key.clone())
            )
            .is_ok());
    }

    #[test]
    fn test_rs384_and_rs512_roundtrip() {
        let (private_key, public_key) = test_keys::rsa_key_pair();
        let signing_input = "header.payload";

        for method in [&RS384 as &dyn SigningMethod, &RS512] {
            let signature = method
                .sign(signing_input, &SigningKey::rsa(private_key.clone()))
                .unwrap();
            assert!(
                method
                    .verify(
                        signing_input,
                        &signature,
                        &VerifyingKey::rsa(public_key.clone())
                    )
                    .is_ok(),
                "{} roundtrip",
                method.alg()
            );
        }
    }

    #[test]
    fn test_tampered_input_fails() {
        let (private_key, public_key) = test_keys::rsa_key_pair();
        let signature = RS256
            .sign("header.payload", &SigningKey::rsa(private_key.clone()))
            .unwrap();

        let result = RS256.verify(
            "header.tampered",
            &signature,
            &VerifyingKey::rsa(public_key.clone()),
        );
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }

    #[test]
    fn test_garbage_signature_fails() {
        let (_, public_key) = test_keys::rsa_key_pair();
        let garbage = base64url::encode("not a signature");
        let result = RS256.verify(
            "header.payload",
            &garbage,
            &VerifyingKey::rsa(public_key.clone()),
        );
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }

    #[test]
    fn test_digest_mismatch_fails() {
        let (private_key, public_key) = test_keys::rsa_key_pair();
        let signature = RS256
            .sign("header.payload", &SigningKey::rsa(private_key.clone()))
            .unwrap();

        let result = RS384.verify(
            "header.payload",
            &signature,
            &VerifyingKey::rsa(public_key.clone()),
        );
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }

    #[test]
    fn test_wrong_key_type() {
        let result = RS256.sign("input", &SigningKey::hmac("secret"));
        assert!(matches!(result, Err(Error::KeyTypeMismatch { .. })));

        let result = RS256.verify("input", "sig", &VerifyingKey::hmac("secret"));
        assert!(matches!(result, Err(Error::KeyTypeMismatch { .. })));
    }
}
