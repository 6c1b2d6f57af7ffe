//! Token claims and their verification
//!
//! Claims come in two shapes: [`RegisteredClaims`], the fixed RFC 7519
//! Section 4.1 field set, and [`MapClaims`], an open mapping for
//! application-defined payloads. [`Claims`] closes the two into one sum
//! type so every consumer dispatches statically instead of downcasting.
//!
//! Verification is claim-by-claim: each `verify_*` method takes a
//! `required` flag, and an absent claim passes whenever `required` is
//! false. The aggregate [`Claims::valid`] runs the three time checks
//! non-required and collects failures into one [`ValidationError`].

mod values;

pub use values::{ClaimStrings, NumericDate};

use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, ValidationError, ValidationFlags};

/// The payload of a token, in either of its two supported shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Claims {
    /// The fixed RFC 7519 registered claim set
    Registered(RegisteredClaims),

    /// An open claim mapping read through well-known keys
    Map(MapClaims),
}

impl Claims {
    /// The registered variant, if that is what this is
    pub fn registered(&self) -> Option<&RegisteredClaims> {
        match self {
            Claims::Registered(claims) => Some(claims),
            Claims::Map(_) => None,
        }
    }

    /// The map variant, if that is what this is
    pub fn map(&self) -> Option<&MapClaims> {
        match self {
            Claims::Registered(_) => None,
            Claims::Map(claims) => Some(claims),
        }
    }

    /// Compare the `aud` claim against `cmp`
    pub fn verify_audience(&self, cmp: &str, required: bool) -> bool {
        match self {
            Claims::Registered(c) => c.verify_audience(cmp, required),
            Claims::Map(c) => c.verify_audience(cmp, required),
        }
    }

    /// Check the `exp` claim against `now` (epoch seconds)
    pub fn verify_expires_at(&self, now: i64, required: bool) -> bool {
        match self {
            Claims::Registered(c) => c.verify_expires_at(now, required),
            Claims::Map(c) => c.verify_expires_at(now, required),
        }
    }

    /// Check the `iat` claim against `now` (epoch seconds)
    pub fn verify_issued_at(&self, now: i64, required: bool) -> bool {
        match self {
            Claims::Registered(c) => c.verify_issued_at(now, required),
            Claims::Map(c) => c.verify_issued_at(now, required),
        }
    }

    /// Check the `nbf` claim against `now` (epoch seconds)
    pub fn verify_not_before(&self, now: i64, required: bool) -> bool {
        match self {
            Claims::Registered(c) => c.verify_not_before(now, required),
            Claims::Map(c) => c.verify_not_before(now, required),
        }
    }

    /// Compare the `iss` claim against `cmp`
    pub fn verify_issuer(&self, cmp: &str, required: bool) -> bool {
        match self {
            Claims::Registered(c) => c.verify_issuer(cmp, required),
            Claims::Map(c) => c.verify_issuer(cmp, required),
        }
    }

    /// Run the time-based checks (`exp`, `iat`, `nbf`) against the current
    /// time
    ///
    /// Absent claims pass. Failures accumulate: every failing check ORs its
    /// category into the result, and the cause of the last failing check in
    /// the fixed order exp, iat, nbf survives as the wrapped inner error.
    pub fn valid(&self) -> Result<(), ValidationError> {
        self.valid_at(NumericDate::now().as_secs())
    }

    /// [`Claims::valid`] against an explicit timestamp
    pub fn valid_at(&self, now: i64) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();
        if !self.verify_expires_at(now, false) {
            err.record(ValidationFlags::EXPIRED, Error::TokenExpired);
        }
        if !self.verify_issued_at(now, false) {
            err.record(ValidationFlags::ISSUED_AT, Error::TokenUsedBeforeIssued);
        }
        if !self.verify_not_before(now, false) {
            err.record(ValidationFlags::NOT_VALID_YET, Error::TokenNotValidYet);
        }
        if err.is_empty() {
            Ok(())
        } else {
            Err(err)
        }
    }
}

impl Serialize for Claims {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Claims::Registered(c) => c.serialize(serializer),
            Claims::Map(c) => c.serialize(serializer),
        }
    }
}

impl From<RegisteredClaims> for Claims {
    fn from(claims: RegisteredClaims) -> Self {
        Claims::Registered(claims)
    }
}

impl From<MapClaims> for Claims {
    fn from(claims: MapClaims) -> Self {
        Claims::Map(claims)
    }
}

/// The registered claim names of RFC 7519 Section 4.1
///
/// Every field is optional; an absent claim is unset rather than a zero
/// value masquerading as a real timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    /// Issuer ("iss")
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Subject ("sub")
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Audience ("aud"); a string or an array of strings on the wire
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<ClaimStrings>,

    /// Expiration time ("exp")
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NumericDate>,

    /// Not before ("nbf")
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<NumericDate>,

    /// Issued at ("iat")
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NumericDate>,

    /// Token id ("jti")
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RegisteredClaims {
    pub fn verify_audience(&self, cmp: &str, required: bool) -> bool {
        let aud = self.audience.as_ref().map(|a| a.as_slice()).unwrap_or(&[]);
        verify_aud(aud, cmp, required)
    }

    pub fn verify_expires_at(&self, now: i64, required: bool) -> bool {
        verify_exp(self.expires_at, now, required)
    }

    pub fn verify_issued_at(&self, now: i64, required: bool) -> bool {
        verify_iat(self.issued_at, now, required)
    }

    pub fn verify_not_before(&self, now: i64, required: bool) -> bool {
        verify_nbf(self.not_before, now, required)
    }

    pub fn verify_issuer(&self, cmp: &str, required: bool) -> bool {
        verify_iss(self.issuer.as_deref(), cmp, required)
    }
}

/// An open claim mapping
///
/// Semantic verification reads the well-known keys ("aud", "exp", "nbf",
/// "iat", "iss") with permissive numeric typing: a time claim may be a JSON
/// number or a string-encoded number. A numeric time claim of 0 is treated
/// as unset. A present time claim of any other shape fails its check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapClaims(Map<String, Value>);

impl MapClaims {
    /// An empty claim mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a claim
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Read a claim
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a string-valued claim
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn verify_audience(&self, cmp: &str, required: bool) -> bool {
        let aud: Vec<String> = match self.0.get("aud") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(values)) => {
                let mut aud = Vec::with_capacity(values.len());
                for value in values {
                    match value.as_str() {
                        Some(s) => aud.push(s.to_string()),
                        None => return false,
                    }
                }
                aud
            }
            Some(_) => return false,
        };
        verify_aud(&aud, cmp, required)
    }

    pub fn verify_expires_at(&self, now: i64, required: bool) -> bool {
        match self.time_claim("exp") {
            TimeClaim::Unset => !required,
            TimeClaim::At(date) => verify_exp(Some(date), now, required),
            TimeClaim::Invalid => false,
        }
    }

    pub fn verify_issued_at(&self, now: i64, required: bool) -> bool {
        match self.time_claim("iat") {
            TimeClaim::Unset => !required,
            TimeClaim::At(date) => verify_iat(Some(date), now, required),
            TimeClaim::Invalid => false,
        }
    }

    pub fn verify_not_before(&self, now: i64, required: bool) -> bool {
        match self.time_claim("nbf") {
            TimeClaim::Unset => !required,
            TimeClaim::At(date) => verify_nbf(Some(date), now, required),
            TimeClaim::Invalid => false,
        }
    }

    pub fn verify_issuer(&self, cmp: &str, required: bool) -> bool {
        verify_iss(self.get_str("iss"), cmp, required)
    }

    fn time_claim(&self, key: &str) -> TimeClaim {
        let value = match self.0.get(key) {
            None => return TimeClaim::Unset,
            Some(v) => v,
        };
        let secs = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        };
        match secs {
            Some(s) if s == 0.0 => TimeClaim::Unset,
            Some(s) => TimeClaim::At(NumericDate::from_secs_f64(s)),
            None => TimeClaim::Invalid,
        }
    }
}

impl FromIterator<(String, Value)> for MapClaims {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        MapClaims(iter.into_iter().collect())
    }
}

enum TimeClaim {
    Unset,
    At(NumericDate),
    Invalid,
}

// Shared verification helpers for both claim shapes
//

fn verify_aud(aud: &[String], cmp: &str, required: bool) -> bool {
    if aud.is_empty() {
        return !required;
    }
    // Walk every entry to keep the comparison constant-time over the claim
    // list
    let mut result = false;
    let mut total_len = 0;
    for a in aud {
        if constant_time_eq(a.as_bytes(), cmp.as_bytes()) {
            result = true;
        }
        total_len += a.len();
    }
    // All-empty audiences count as unset
    if total_len == 0 {
        return !required;
    }
    result
}

fn verify_exp(exp: Option<NumericDate>, now: i64, required: bool) -> bool {
    match exp {
        None => !required,
        Some(exp) => now < exp.as_secs(),
    }
}

fn verify_iat(iat: Option<NumericDate>, now: i64, required: bool) -> bool {
    match iat {
        None => !required,
        Some(iat) => now >= iat.as_secs(),
    }
}

fn verify_nbf(nbf: Option<NumericDate>, now: i64, required: bool) -> bool {
    match nbf {
        None => !required,
        Some(nbf) => now >= nbf.as_secs(),
    }
}

fn verify_iss(iss: Option<&str>, cmp: &str, required: bool) -> bool {
    match iss {
        None | Some("") => !required,
        Some(iss) => constant_time_eq(iss.as_bytes(), cmp.as_bytes()),
    }
}
