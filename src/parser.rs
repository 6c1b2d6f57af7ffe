//! Compact-token parsing and verification
//!
//! A token moves through three stages: the raw string, the structurally
//! parsed token (segments split, header and claims decoded, method
//! resolved), and the verified token (signature checked, claims validated).
//! [`Parser::parse_unverified`] stops after the second stage and never marks
//! a token valid: it exists so callers can inspect an untrusted header
//! (say, to pick a verification key by its `kid`) and must never stand in
//! for verification.
//!
//! Failures carry the partially populated token alongside the aggregate
//! error so callers can log what was rejected.

use crate::algorithm::get_signing_method;
use crate::claims::{Claims, MapClaims, RegisteredClaims};
use crate::error::{Error, ValidationError, ValidationFlags};
use crate::keys::VerifyingKey;
use crate::token::{Token, TokenHeader};
use crate::utils::base64url;

/// Which shape the claims segment decodes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimsFormat {
    /// Decode into an open [`MapClaims`] mapping
    #[default]
    Map,

    /// Decode into the fixed [`RegisteredClaims`] struct
    Registered,
}

/// Resolves the verification key for a structurally parsed token
///
/// The resolver receives the parsed but unverified token so it can pick a
/// key from the header (algorithm, key id). It must return a public
/// verification key. Returning an [`Error::Validation`] passes that
/// outcome through to the caller unchanged; any other error marks the token
/// unverifiable.
pub type KeyResolver = dyn Fn(&Token) -> Result<VerifyingKey, Error> + Send + Sync;

/// The three raw segments of a compact token
#[derive(Debug, Clone)]
pub struct TokenParts {
    /// Base64URL header segment
    pub header: String,

    /// Base64URL claims segment
    pub claims: String,

    /// Base64URL signature segment
    pub signature: String,
}

impl TokenParts {
    /// The two-segment input the signature covers
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.claims)
    }
}

/// A rejected token: the aggregate error plus whatever was decoded before
/// the rejection, for diagnostics
#[derive(Debug)]
pub struct ParseRejection {
    /// The partially populated token, when structure survived long enough
    pub token: Option<Token>,

    /// The accumulated validation outcome
    pub error: ValidationError,
}

impl ParseRejection {
    fn new(token: Option<Token>, error: ValidationError) -> Self {
        Self { token, error }
    }

    fn bare(flags: ValidationFlags, cause: Error) -> Self {
        Self::new(None, ValidationError::new(flags, cause))
    }
}

impl std::fmt::Display for ParseRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ParseRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<ParseRejection> for ValidationError {
    fn from(rejection: ParseRejection) -> Self {
        rejection.error
    }
}

/// Parses and verifies compact tokens
#[derive(Debug, Clone, Default)]
pub struct Parser {
    valid_methods: Vec<String>,
    skip_claims_validation: bool,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict verification to an allow-list of algorithm names
    ///
    /// A token resolving to any other method is rejected with
    /// `SIGNATURE_INVALID` before key lookup or any cryptography runs.
    pub fn with_valid_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Skip the claims `valid()` check (signature is still verified)
    pub fn skip_claims_validation(mut self, skip: bool) -> Self {
        self.skip_claims_validation = skip;
        self
    }

    /// Parse and verify with map-shaped claims
    pub fn parse(
        &self,
        token_string: &str,
        key_resolver: Option<&KeyResolver>,
    ) -> Result<Token, ParseRejection> {
        self.parse_with_claims(token_string, ClaimsFormat::Map, key_resolver)
    }

    /// Parse and verify, decoding claims into the requested shape
    pub fn parse_with_claims(
        &self,
        token_string: &str,
        format: ClaimsFormat,
        key_resolver: Option<&KeyResolver>,
    ) -> Result<Token, ParseRejection> {
        let (mut token, parts) = self.parse_unverified(token_string, format)?;
        // parse_unverified only succeeds with a resolved method
        let method = match token.method {
            Some(method) => method,
            None => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(
                        ValidationFlags::UNVERIFIABLE,
                        Error::AlgorithmUnspecified,
                    ),
                ));
            }
        };

        // The allow-list runs before key lookup and before any cryptography
        if !self.valid_methods.is_empty() {
            let alg = method.alg();
            if !self.valid_methods.iter().any(|m| m == alg) {
                tracing::debug!(alg, "rejected token signed with disallowed method");
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(
                        ValidationFlags::SIGNATURE_INVALID,
                        Error::InvalidSigningMethod(alg.to_string()),
                    ),
                ));
            }
        }

        let resolver = match key_resolver {
            Some(resolver) => resolver,
            None => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(ValidationFlags::UNVERIFIABLE, Error::NoKeyResolver),
                ));
            }
        };
        let key = match resolver(&token) {
            Ok(key) => key,
            // An already-aggregated outcome passes through unchanged; any
            // other resolver failure makes the token unverifiable
            Err(Error::Validation(err)) => {
                return Err(ParseRejection::new(Some(token), err));
            }
            Err(err) => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(ValidationFlags::UNVERIFIABLE, err),
                ));
            }
        };

        let mut aggregate = ValidationError::default();
        if !self.skip_claims_validation {
            if let Err(err) = token.claims.valid() {
                // Reuse the claims outcome directly so its flags survive
                aggregate = err;
            }
        }

        token.signature = parts.signature.clone();
        if let Err(err) = method.verify(&parts.signing_input(), &token.signature, &key) {
            aggregate.record(ValidationFlags::SIGNATURE_INVALID, err);
        }

        if aggregate.is_empty() {
            token.valid = true;
            Ok(token)
        } else {
            tracing::debug!(flags = ?aggregate.flags(), "token rejected");
            Err(ParseRejection::new(Some(token), aggregate))
        }
    }

    /// Structurally parse a token without verifying anything
    ///
    /// Splits the segments, decodes header and claims, and resolves the
    /// signing method. The returned token never has `valid` set and its
    /// signature segment is left unpopulated; the segments come back in
    /// [`TokenParts`] for callers that go on to verify.
    pub fn parse_unverified(
        &self,
        token_string: &str,
        format: ClaimsFormat,
    ) -> Result<(Token, TokenParts), ParseRejection> {
        let segments: Vec<&str> = token_string.split('.').collect();
        if segments.len() != 3 {
            return Err(ParseRejection::bare(
                ValidationFlags::MALFORMED,
                Error::Malformed("token contains an invalid number of segments".to_string()),
            ));
        }
        let parts = TokenParts {
            header: segments[0].to_string(),
            claims: segments[1].to_string(),
            signature: segments[2].to_string(),
        };

        let mut token = Token {
            raw: token_string.to_string(),
            method: None,
            header: TokenHeader::default(),
            claims: match format {
                ClaimsFormat::Map => Claims::Map(MapClaims::new()),
                ClaimsFormat::Registered => Claims::Registered(RegisteredClaims::default()),
            },
            signature: String::new(),
            valid: false,
        };

        let header_bytes = match base64url::decode_bytes(&parts.header) {
            Ok(bytes) => bytes,
            Err(err) => {
                // A pasted "Bearer xxx" value is a common caller mistake;
                // name it instead of reporting a bad segment
                if token_string.to_lowercase().starts_with("bearer ") {
                    return Err(ParseRejection::new(
                        Some(token),
                        ValidationError::new(
                            ValidationFlags::MALFORMED,
                            Error::Malformed(
                                "token string should not contain 'bearer '".to_string(),
                            ),
                        ),
                    ));
                }
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(ValidationFlags::MALFORMED, err),
                ));
            }
        };
        token.header = match serde_json::from_slice(&header_bytes) {
            Ok(header) => header,
            Err(err) => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(
                        ValidationFlags::MALFORMED,
                        Error::InvalidJson(err.to_string()),
                    ),
                ));
            }
        };

        let claim_bytes = match base64url::decode_bytes(&parts.claims) {
            Ok(bytes) => bytes,
            Err(err) => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(ValidationFlags::MALFORMED, err),
                ));
            }
        };
        let decoded = match format {
            ClaimsFormat::Map => {
                serde_json::from_slice::<MapClaims>(&claim_bytes).map(Claims::Map)
            }
            ClaimsFormat::Registered => {
                serde_json::from_slice::<RegisteredClaims>(&claim_bytes).map(Claims::Registered)
            }
        };
        token.claims = match decoded {
            Ok(claims) => claims,
            Err(err) => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(
                        ValidationFlags::MALFORMED,
                        Error::InvalidJson(err.to_string()),
                    ),
                ));
            }
        };

        let alg = token.header.algorithm().map(str::to_owned);
        match alg {
            Some(alg) => match get_signing_method(&alg) {
                Some(method) => token.method = Some(method),
                None => {
                    return Err(ParseRejection::new(
                        Some(token),
                        ValidationError::new(
                            ValidationFlags::UNVERIFIABLE,
                            Error::AlgorithmUnavailable(alg),
                        ),
                    ));
                }
            },
            None => {
                return Err(ParseRejection::new(
                    Some(token),
                    ValidationError::new(
                        ValidationFlags::UNVERIFIABLE,
                        Error::AlgorithmUnspecified,
                    ),
                ));
            }
        }

        Ok((token, parts))
    }
}
