//! Error types for token processing
//!
//! Two layers: [`Error`] names a single concrete failure (a bad segment, a
//! rejected signature, a key of the wrong shape), while [`ValidationError`]
//! aggregates everything that went wrong while verifying one token into a
//! set of category flags plus the most recent underlying cause. Key-store
//! startup failures use the separate [`KeyStoreError`], since they are fatal
//! to the process rather than recoverable per-token outcomes.

use std::fmt;

/// Failure categories for token validation
///
/// Categories combine: a token that is both expired and not yet valid is
/// rejected with both bits set rather than whichever check ran first.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationFlags(u32);

impl ValidationFlags {
    /// Structurally invalid segments or encoding
    pub const MALFORMED: ValidationFlags = ValidationFlags(1 << 0);

    /// No usable key or algorithm to check the signature with
    pub const UNVERIFIABLE: ValidationFlags = ValidationFlags(1 << 1);

    /// Cryptographic verification failed, or the algorithm is not allow-listed
    pub const SIGNATURE_INVALID: ValidationFlags = ValidationFlags(1 << 2);

    /// The `exp` claim is in the past
    pub const EXPIRED: ValidationFlags = ValidationFlags(1 << 3);

    /// The `nbf` claim is in the future
    pub const NOT_VALID_YET: ValidationFlags = ValidationFlags(1 << 4);

    /// The `iat` claim is in the future (token used before issued)
    pub const ISSUED_AT: ValidationFlags = ValidationFlags(1 << 5);

    /// A claims failure not captured by the categories above
    pub const CLAIMS_INVALID: ValidationFlags = ValidationFlags(1 << 6);

    /// No category set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every category in `other` is set in `self`
    pub fn contains(self, other: ValidationFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ValidationFlags {
    type Output = ValidationFlags;

    fn bitor(self, rhs: ValidationFlags) -> ValidationFlags {
        ValidationFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ValidationFlags {
    fn bitor_assign(&mut self, rhs: ValidationFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ValidationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ValidationFlags, &str); 7] = [
            (ValidationFlags::MALFORMED, "MALFORMED"),
            (ValidationFlags::UNVERIFIABLE, "UNVERIFIABLE"),
            (ValidationFlags::SIGNATURE_INVALID, "SIGNATURE_INVALID"),
            (ValidationFlags::EXPIRED, "EXPIRED"),
            (ValidationFlags::NOT_VALID_YET, "NOT_VALID_YET"),
            (ValidationFlags::ISSUED_AT, "ISSUED_AT"),
            (ValidationFlags::CLAIMS_INVALID, "CLAIMS_INVALID"),
        ];

        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A single concrete failure during token processing
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Structurally invalid token (segment count, stray prefix, bad JSON)
    Malformed(String),

    /// Base64URL decoding failed
    InvalidBase64(String),

    /// JSON decoding of a segment failed
    InvalidJson(String),

    /// The header carries no `alg` field
    AlgorithmUnspecified,

    /// The header names an algorithm the registry does not know
    AlgorithmUnavailable(String),

    /// The resolved algorithm is not in the parser's allow-list
    InvalidSigningMethod(String),

    /// A key resolver refused the token's algorithm
    UnexpectedSigningMethod(String),

    /// Key shape does not match the algorithm family
    KeyTypeMismatch {
        algorithm: String,
        expected: String,
        actual: String,
    },

    /// Cryptographic signature verification failed
    SignatureInvalid,

    /// Producing a signature failed
    Signing(String),

    /// The `exp` claim is in the past
    TokenExpired,

    /// The `nbf` claim is in the future
    TokenNotValidYet,

    /// The `iat` claim is in the future
    TokenUsedBeforeIssued,

    /// Verification was requested without a key resolver
    NoKeyResolver,

    /// No bearer token present in the supplied header value
    NoTokenInRequest,

    /// An already-aggregated validation outcome, passed through unchanged
    Validation(ValidationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Malformed(msg) => write!(f, "malformed token: {msg}"),
            Error::InvalidBase64(msg) => write!(f, "base64url decoding failed: {msg}"),
            Error::InvalidJson(msg) => write!(f, "JSON decoding failed: {msg}"),
            Error::AlgorithmUnspecified => write!(f, "signing method (alg) is unspecified"),
            Error::AlgorithmUnavailable(alg) => {
                write!(f, "signing method (alg) {alg:?} is unavailable")
            }
            Error::InvalidSigningMethod(alg) => write!(f, "signing method {alg} is invalid"),
            Error::UnexpectedSigningMethod(alg) => {
                write!(f, "unexpected signing method: {alg}")
            }
            Error::KeyTypeMismatch {
                algorithm,
                expected,
                actual,
            } => write!(
                f,
                "key type mismatch for {algorithm}: expected {expected}, got {actual}"
            ),
            Error::SignatureInvalid => write!(f, "signature verification failed"),
            Error::Signing(msg) => write!(f, "signing failed: {msg}"),
            Error::TokenExpired => write!(f, "token is expired"),
            Error::TokenNotValidYet => write!(f, "token is not valid yet"),
            Error::TokenUsedBeforeIssued => write!(f, "token used before issued"),
            Error::NoKeyResolver => write!(f, "no key resolver provided"),
            Error::NoTokenInRequest => write!(f, "no token present in request"),
            Error::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

/// Aggregate outcome of verifying one token
///
/// Checks OR their category flag into `flags` as they fail; the cause of the
/// most recent failing check is kept as the wrapped inner error. An instance
/// with no flags set is the internal "nothing failed yet" sentinel, answered
/// by [`ValidationError::is_empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationError {
    flags: ValidationFlags,
    inner: Option<Box<Error>>,
}

impl ValidationError {
    /// Build an error with one category set and the given cause
    pub fn new(flags: ValidationFlags, cause: Error) -> Self {
        Self {
            flags,
            inner: Some(Box::new(cause)),
        }
    }

    /// Build an error from a category alone
    pub fn from_flags(flags: ValidationFlags) -> Self {
        Self { flags, inner: None }
    }

    /// Record a failing check: OR in its category, replace the cause
    pub fn record(&mut self, flags: ValidationFlags, cause: Error) {
        self.flags |= flags;
        self.inner = Some(Box::new(cause));
    }

    /// Whether no check has failed
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// The accumulated failure categories
    pub fn flags(&self) -> ValidationFlags {
        self.flags
    }

    /// The cause of the most recent failing check, if any
    pub fn inner(&self) -> Option<&Error> {
        self.inner.as_deref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(inner) = &self.inner {
            return write!(f, "{inner}");
        }
        let msg = if self.flags.contains(ValidationFlags::MALFORMED) {
            "token is malformed"
        } else if self.flags.contains(ValidationFlags::UNVERIFIABLE) {
            "token could not be verified"
        } else if self.flags.contains(ValidationFlags::SIGNATURE_INVALID) {
            "token signature is invalid"
        } else if self.flags.contains(ValidationFlags::EXPIRED) {
            "token is expired"
        } else if self.flags.contains(ValidationFlags::NOT_VALID_YET) {
            "token is not valid yet"
        } else if self.flags.contains(ValidationFlags::ISSUED_AT) {
            "token used before issued"
        } else if self.flags.contains(ValidationFlags::CLAIMS_INVALID) {
            "token claims are invalid"
        } else {
            "token is invalid"
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

/// Failures while establishing key material at startup
///
/// These are fatal: the service cannot issue or verify anything without a
/// key pair, so callers propagate them out of process initialization.
#[derive(Debug)]
pub enum KeyStoreError {
    /// Reading or writing a key file failed
    Io(std::io::Error),

    /// The private key file did not contain a usable RSA private key
    InvalidPrivateKey(String),

    /// The public key file did not contain a usable RSA public key
    InvalidPublicKey(String),

    /// Generating a fresh key pair failed
    Generate(String),
}

impl fmt::Display for KeyStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStoreError::Io(err) => write!(f, "key file I/O failed: {err}"),
            KeyStoreError::InvalidPrivateKey(msg) => {
                write!(f, "invalid RSA private key: {msg}")
            }
            KeyStoreError::InvalidPublicKey(msg) => write!(f, "invalid RSA public key: {msg}"),
            KeyStoreError::Generate(msg) => write!(f, "RSA key generation failed: {msg}"),
        }
    }
}

impl std::error::Error for KeyStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeyStoreError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeyStoreError {
    fn from(err: std::io::Error) -> Self {
        KeyStoreError::Io(err)
    }
}

/// Result type alias for token processing
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let mut flags = ValidationFlags::EXPIRED;
        flags |= ValidationFlags::NOT_VALID_YET;

        assert!(flags.contains(ValidationFlags::EXPIRED));
        assert!(flags.contains(ValidationFlags::NOT_VALID_YET));
        assert!(!flags.contains(ValidationFlags::MALFORMED));
        assert!(flags.contains(ValidationFlags::EXPIRED | ValidationFlags::NOT_VALID_YET));
    }

    #[test]
    fn test_empty_error_is_sentinel() {
        let err = ValidationError::default();
        assert!(err.is_empty());
        assert!(err.inner().is_none());

        let mut err = ValidationError::default();
        err.record(ValidationFlags::EXPIRED, Error::TokenExpired);
        assert!(!err.is_empty());
        assert_eq!(err.inner(), Some(&Error::TokenExpired));
    }

    #[test]
    fn test_record_keeps_last_cause() {
        let mut err = ValidationError::default();
        err.record(ValidationFlags::EXPIRED, Error::TokenExpired);
        err.record(ValidationFlags::NOT_VALID_YET, Error::TokenNotValidYet);

        assert!(err.flags().contains(ValidationFlags::EXPIRED));
        assert!(err.flags().contains(ValidationFlags::NOT_VALID_YET));
        assert_eq!(err.inner(), Some(&Error::TokenNotValidYet));
    }

    #[test]
    fn test_display_uses_inner_cause() {
        let err = ValidationError::new(ValidationFlags::EXPIRED, Error::TokenExpired);
        assert_eq!(err.to_string(), "token is expired");

        let err = ValidationError::from_flags(ValidationFlags::SIGNATURE_INVALID);
        assert_eq!(err.to_string(), "token signature is invalid");
    }

    #[test]
    fn test_flags_debug_names() {
        let flags = ValidationFlags::EXPIRED | ValidationFlags::NOT_VALID_YET;
        assert_eq!(format!("{flags:?}"), "EXPIRED | NOT_VALID_YET");
        assert_eq!(format!("{:?}", ValidationFlags::default()), "(none)");
    }
}
