//! Sign-then-verify round trips across every supported algorithm

use std::sync::OnceLock;

use serde_json::json;
use webtoken::algorithm::{hmac, rsa};
use webtoken::keystore::generate_rsa_private_key;
use webtoken::{
    ClaimsFormat, Error, MapClaims, NumericDate, Parser, RegisteredClaims, SigningKey,
    SigningMethod, Token, ValidationFlags, VerifyingKey,
};

static KEYS: OnceLock<(::rsa::RsaPrivateKey, ::rsa::RsaPublicKey)> = OnceLock::new();

fn rsa_key_pair() -> (::rsa::RsaPrivateKey, ::rsa::RsaPublicKey) {
    KEYS.get_or_init(|| {
        let private_key = generate_rsa_private_key(2048).expect("test RSA key generation");
        let public_key = ::rsa::RsaPublicKey::from(&private_key);
        (private_key, public_key)
    })
    .clone()
}

fn sample_claims() -> MapClaims {
    let mut claims = MapClaims::new();
    claims.insert("sub", json!("1234567890"));
    claims.insert("name", json!("John Doe"));
    claims.insert("exp", json!(NumericDate::now().as_secs() + 3600));
    claims
}

fn keys_for(method: &'static dyn SigningMethod) -> (SigningKey, VerifyingKey) {
    if method.alg().starts_with("RS") {
        let (private_key, public_key) = rsa_key_pair();
        (SigningKey::rsa(private_key), VerifyingKey::rsa(public_key))
    } else {
        (
            SigningKey::hmac(b"shared-integration-secret"),
            VerifyingKey::hmac(b"shared-integration-secret"),
        )
    }
}

#[test]
fn round_trip_all_algorithms() {
    let methods: [&'static dyn SigningMethod; 6] = [
        &rsa::RS256,
        &rsa::RS384,
        &rsa::RS512,
        &hmac::HS256,
        &hmac::HS384,
        &hmac::HS512,
    ];

    for method in methods {
        let (signing_key, verifying_key) = keys_for(method);
        let claims = sample_claims();
        let compact = Token::with_claims(method, claims.clone())
            .signed_string(&signing_key)
            .unwrap();

        let resolver = move |_: &Token| -> Result<VerifyingKey, Error> { Ok(verifying_key.clone()) };
        let token = Parser::new()
            .with_valid_methods([method.alg()])
            .parse(&compact, Some(&resolver))
            .unwrap_or_else(|e| panic!("{} round trip failed: {e}", method.alg()));

        assert!(token.valid, "{}", method.alg());
        // Decoded claims equal what was signed
        assert_eq!(token.claims.map(), Some(&claims), "{}", method.alg());
        assert_eq!(token.header.algorithm(), Some(method.alg()));
    }
}

#[test]
fn round_trip_registered_claims() {
    let (private_key, public_key) = rsa_key_pair();
    let claims = RegisteredClaims {
        issuer: Some("https://issuer.example.com".to_string()),
        subject: Some("user123".to_string()),
        expires_at: Some(NumericDate::from_secs(NumericDate::now().as_secs() + 600)),
        issued_at: Some(NumericDate::now()),
        ..Default::default()
    };

    let compact = Token::with_claims(&rsa::RS256, claims.clone())
        .signed_string(&SigningKey::rsa(private_key))
        .unwrap();

    let resolver = move |_: &Token| -> Result<VerifyingKey, Error> {
        Ok(VerifyingKey::rsa(public_key.clone()))
    };
    let token = Parser::new()
        .parse_with_claims(&compact, ClaimsFormat::Registered, Some(&resolver))
        .unwrap();

    assert!(token.valid);
    assert_eq!(token.claims.registered(), Some(&claims));
}

#[test]
fn tampering_with_any_segment_invalidates() {
    let (private_key, public_key) = rsa_key_pair();
    let compact = Token::with_claims(&rsa::RS256, sample_claims())
        .signed_string(&SigningKey::rsa(private_key))
        .unwrap();

    let segments: Vec<&str> = compact.split('.').collect();

    // Flip the leading character of the signature segment; its bits always
    // land in the decoded signature, unlike trailing padding bits
    let mut tampered_sig = segments[2].to_string();
    let flipped = if tampered_sig.starts_with('A') { "B" } else { "A" };
    tampered_sig.replace_range(..1, flipped);
    let tampered = format!("{}.{}.{}", segments[0], segments[1], tampered_sig);

    let resolver = move |_: &Token| -> Result<VerifyingKey, Error> {
        Ok(VerifyingKey::rsa(public_key.clone()))
    };
    let rejection = Parser::new()
        .parse(&tampered, Some(&resolver))
        .unwrap_err();
    assert!(rejection
        .error
        .flags()
        .contains(ValidationFlags::SIGNATURE_INVALID));
    assert!(!rejection.token.unwrap().valid);
}

#[test]
fn cross_family_keys_do_not_verify() {
    let (private_key, _) = rsa_key_pair();
    let compact = Token::with_claims(&rsa::RS256, sample_claims())
        .signed_string(&SigningKey::rsa(private_key))
        .unwrap();

    // Presenting an HMAC secret for an RSA token is a key-type mismatch,
    // surfaced as an unverifiable signature
    let resolver =
        |_: &Token| -> Result<VerifyingKey, Error> { Ok(VerifyingKey::hmac(b"secret")) };
    let rejection = Parser::new().parse(&compact, Some(&resolver)).unwrap_err();
    assert!(rejection
        .error
        .flags()
        .contains(ValidationFlags::SIGNATURE_INVALID));
    assert!(matches!(
        rejection.error.inner(),
        Some(Error::KeyTypeMismatch { .. })
    ));
}
