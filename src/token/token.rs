use std::fmt;

use crate::algorithm::SigningMethod;
use crate::claims::Claims;
use crate::error::{Error, Result};
use crate::keys::SigningKey;
use crate::token::TokenHeader;
use crate::utils::base64url;

/// A token, on either side of the wire
///
/// Built by [`Token::with_claims`] for issuance or populated by the parser.
/// `valid` is set only by a successful full parse-and-verify; a token built
/// for issuance or returned by an unverified parse always carries `false`.
/// A token is created once and never mutated afterwards, so sharing it with
/// read-only consumers is safe.
pub struct Token {
    /// The compact string this token was parsed from, empty when issued
    pub raw: String,

    /// The resolved signing method, absent until the header names one
    pub method: Option<&'static dyn SigningMethod>,

    /// The decoded header
    pub header: TokenHeader,

    /// The decoded payload
    pub claims: Claims,

    /// The raw signature segment, populated when parsing
    pub signature: String,

    /// Whether a full parse-and-verify succeeded
    pub valid: bool,
}

impl Token {
    /// Build an unsigned token around `claims` with a `{"typ":"JWT","alg":…}`
    /// header
    pub fn with_claims(method: &'static dyn SigningMethod, claims: impl Into<Claims>) -> Self {
        Self {
            raw: String::new(),
            method: Some(method),
            header: TokenHeader::new(method.alg()),
            claims: claims.into(),
            signature: String::new(),
            valid: false,
        }
    }

    /// The two-segment signing input: `base64url(header).base64url(claims)`
    pub fn signing_string(&self) -> Result<String> {
        let header =
            serde_json::to_vec(&self.header).map_err(|e| Error::InvalidJson(e.to_string()))?;
        let claims =
            serde_json::to_vec(&self.claims).map_err(|e| Error::InvalidJson(e.to_string()))?;
        Ok(format!(
            "{}.{}",
            base64url::encode_bytes(&header),
            base64url::encode_bytes(&claims)
        ))
    }

    /// The full three-segment compact token, signed with `key`
    pub fn signed_string(&self, key: &SigningKey) -> Result<String> {
        let method = self.method.ok_or(Error::AlgorithmUnspecified)?;
        let signing_input = self.signing_string()?;
        let signature = method.sign(&signing_input, key)?;
        Ok(format!("{signing_input}.{signature}"))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("raw", &self.raw)
            .field("method", &self.method.map(|m| m.alg()))
            .field("header", &self.header)
            .field("claims", &self.claims)
            .field("signature", &self.signature)
            .field("valid", &self.valid)
            .finish()
    }
}
