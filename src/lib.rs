//! # webtoken - JWT issuing and validation with key management
//!
//! **webtoken** implements the JWT compact serialization
//! (`base64url(header).base64url(claims).base64url(signature)`, no padding)
//! with the RSA (RS256/RS384/RS512) and HMAC (HS256/HS384/HS512) signing
//! families, claims-based time/audience/issuer validation with a composable
//! error taxonomy, and RSA key-pair lifecycle management (generate-or-load
//! with PEM persistence).
//!
//! ## Quick Start
//!
//! ```ignore
//! use webtoken::{KeyStore, TokenService};
//!
//! // At process startup: generate a key pair or load the persisted one.
//! let keys = KeyStore::initialize("private_key.pem", "public_key.pem")?;
//! let service = TokenService::new(keys);
//!
//! // Issue a token for a logged-in user.
//! let compact = service.generate_signed_token("admin", "ROLE_ADMIN")?;
//!
//! // Later: verify a presented token and read its claims.
//! let token = service.validate_token_string(&compact)?;
//! let role = token.claims.map().and_then(|c| c.get_str("role"));
//! ```
//!
//! ## Verification Flow
//!
//! A presented token moves through three stages:
//!
//! ```text
//! raw compact string
//!     │ split segments, decode header and claims, resolve the method
//!     ▼
//! structurally parsed Token        (Parser::parse_unverified stops here)
//!     │ allow-list check, key lookup, claims validation, signature check
//!     ▼
//! verified Token with valid == true, or ParseRejection carrying the
//! partial Token and a ValidationError
//! ```
//!
//! Failures accumulate instead of short-circuiting: a token that is both
//! expired and not yet valid reports both categories in
//! [`ValidationError::flags`], alongside `SIGNATURE_INVALID` if its
//! signature was bad too.
//!
//! ## Security
//!
//! - **Algorithm confusion prevention**: [`Parser::with_valid_methods`]
//!   rejects tokens naming a method outside the allow-list before key
//!   lookup and before any cryptography; [`TokenService`] pins its single
//!   configured algorithm on both the parser and the key resolver.
//! - **Constant-time comparison**: HMAC verification and audience/issuer
//!   claim matching compare in constant time.
//! - **`ParseUnverified` is not verification**: it decodes an untrusted
//!   token for key selection and never marks a token valid.
//!
//! ## References
//!
//! - [RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515) — JSON Web Signature (JWS)
//! - [RFC 7519](https://datatracker.ietf.org/doc/html/rfc7519) — JSON Web Token (JWT)

// Core modules
pub mod error;
pub mod utils;

// Algorithm system
pub mod algorithm;
pub mod keys;

// Claims and validation
pub mod claims;

// Token model and parsing
pub mod parser;
pub mod token;

// Key lifecycle and the application-facing service
pub mod keystore;
pub mod service;

// Boundary helpers
pub mod request;

// Main flow types
pub use keystore::KeyStore;
pub use parser::{ClaimsFormat, KeyResolver, ParseRejection, Parser, TokenParts};
pub use service::TokenService;
pub use token::{Token, TokenHeader};

// Claims
pub use claims::{ClaimStrings, Claims, MapClaims, NumericDate, RegisteredClaims};

// Supporting types
pub use algorithm::{get_signing_method, SigningMethod};
pub use error::{Error, KeyStoreError, Result, ValidationError, ValidationFlags};
pub use keys::{SigningKey, SymmetricKey, VerifyingKey};
pub use request::extract_bearer_token;
