//! Application token issuance and verification
//!
//! [`TokenService`] ties the key store, a single signing method, and a
//! fixed expiration window together. It is the only piece of this crate
//! with an opinion about claim contents: issued tokens carry `user`,
//! `role`, and `exp`. Construct one service at startup with an initialized
//! [`KeyStore`] and hand it by reference to whatever serves requests.

use std::time::{Duration, SystemTime};

use serde_json::json;

use crate::algorithm::{rsa, SigningMethod};
use crate::claims::{MapClaims, NumericDate};
use crate::error::{Error, ValidationError};
use crate::keys::VerifyingKey;
use crate::keystore::KeyStore;
use crate::parser::Parser;
use crate::token::Token;

/// How long issued tokens live by default
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(12 * 60 * 60);

/// Issues and verifies the application's tokens
pub struct TokenService {
    keys: KeyStore,
    method: &'static dyn SigningMethod,
    expiration: Duration,
}

impl TokenService {
    /// A service signing RS256 tokens valid for [`DEFAULT_EXPIRATION`]
    pub fn new(keys: KeyStore) -> Self {
        Self {
            keys,
            method: &rsa::RS256,
            expiration: DEFAULT_EXPIRATION,
        }
    }

    /// Override the expiration window
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Issue a compact signed token for `username` with `role`
    ///
    /// Claims are `{"user": username, "role": role, "exp": now + window}`.
    pub fn generate_signed_token(&self, username: &str, role: &str) -> Result<String, Error> {
        let expires_at = NumericDate::new(SystemTime::now() + self.expiration);
        let mut claims = MapClaims::new();
        claims.insert("user", json!(username));
        claims.insert("role", json!(role));
        claims.insert("exp", json!(expires_at.as_secs()));

        let token = Token::with_claims(self.method, claims);
        let compact = token.signed_string(&self.keys.signing_key())?;
        tracing::debug!(user = username, role, "issued token");
        Ok(compact)
    }

    /// Verify a compact token and return it with `valid` set
    ///
    /// The parser is restricted to this service's algorithm, and the key
    /// resolver independently rejects any token whose header names a
    /// different one before handing out the public key, so an attacker
    /// cannot substitute a weaker algorithm.
    pub fn validate_token_string(&self, token_string: &str) -> Result<Token, ValidationError> {
        let parser = Parser::new().with_valid_methods([self.method.alg()]);
        let expected_alg = self.method.alg();
        let verifying_key = self.keys.verifying_key();

        let key_resolver = move |token: &Token| -> Result<VerifyingKey, Error> {
            match token.method {
                Some(method) if method.alg() == expected_alg => Ok(verifying_key.clone()),
                _ => Err(Error::UnexpectedSigningMethod(
                    token
                        .header
                        .algorithm()
                        .unwrap_or("<unspecified>")
                        .to_string(),
                )),
            }
        };

        parser
            .parse(token_string, Some(&key_resolver))
            .map_err(|rejection| {
                tracing::warn!(flags = ?rejection.error.flags(), "token validation failed");
                rejection.error
            })
    }

    /// The instant a token issued right now would expire
    ///
    /// Callers use this for cookie `MaxAge` computation.
    pub fn expires_at(&self) -> SystemTime {
        SystemTime::now() + self.expiration
    }

    /// The configured expiration window
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// The configured signing method
    pub fn signing_method(&self) -> &'static dyn SigningMethod {
        self.method
    }
}
