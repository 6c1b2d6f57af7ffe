//! Wire representations for claim values
//!
//! [`NumericDate`] is the RFC 7519 NumericDate: a JSON number of UNIX epoch
//! seconds, held at whole-second precision. [`ClaimStrings`] is the `aud`
//! claim, which may arrive as a single string or an array of strings but is
//! always emitted as an array.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// A timestamp truncated to whole-second precision
///
/// Decoding accepts integer or fractional JSON numbers; the fraction below
/// one second is discarded, so encode∘decode never changes the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumericDate(i64);

impl NumericDate {
    /// Truncate a [`SystemTime`] to seconds since the UNIX epoch
    pub fn new(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => NumericDate(d.as_secs() as i64),
            Err(e) => NumericDate(-(e.duration().as_secs() as i64)),
        }
    }

    /// The current time, truncated to seconds
    pub fn now() -> Self {
        Self::new(SystemTime::now())
    }

    /// Build from whole epoch seconds
    pub fn from_secs(secs: i64) -> Self {
        NumericDate(secs)
    }

    /// Build from fractional epoch seconds, discarding the fraction
    pub fn from_secs_f64(secs: f64) -> Self {
        NumericDate(secs.trunc() as i64)
    }

    /// Epoch seconds
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Convert back to a [`SystemTime`]
    pub fn as_system_time(&self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_secs(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_secs(self.0.unsigned_abs())
        }
    }
}

impl fmt::Display for NumericDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NumericDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

struct NumericDateVisitor;

impl<'de> Visitor<'de> for NumericDateVisitor {
    type Value = NumericDate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a UNIX epoch timestamp as a JSON number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<NumericDate, E> {
        Ok(NumericDate::from_secs(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<NumericDate, E> {
        Ok(NumericDate::from_secs(v as i64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<NumericDate, E> {
        Ok(NumericDate::from_secs_f64(v))
    }
}

impl<'de> Deserialize<'de> for NumericDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(NumericDateVisitor)
            .map_err(|e| de::Error::custom(format!("could not parse numeric date: {e}")))
    }
}

/// The `aud` claim: one or more audience strings
///
/// On the wire this claim is either a bare string or an array of strings;
/// decoding normalizes both shapes to a sequence and rejects arrays holding
/// anything other than strings. JSON `null` decodes to an empty sequence.
/// Encoding always emits the array form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimStrings(Vec<String>);

impl ClaimStrings {
    /// An empty audience list
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// The audience values as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ClaimStrings {
    fn from(values: Vec<String>) -> Self {
        ClaimStrings(values)
    }
}

impl<'a> From<&'a str> for ClaimStrings {
    fn from(value: &'a str) -> Self {
        ClaimStrings(vec![value.to_string()])
    }
}

impl FromIterator<String> for ClaimStrings {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ClaimStrings(iter.into_iter().collect())
    }
}

impl Serialize for ClaimStrings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in &self.0 {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

struct ClaimStringsVisitor;

impl<'de> Visitor<'de> for ClaimStringsVisitor {
    type Value = ClaimStrings;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or an array of strings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ClaimStrings, E> {
        Ok(ClaimStrings(vec![v.to_string()]))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ClaimStrings, E> {
        Ok(ClaimStrings::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ClaimStrings, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(element) = seq.next_element::<serde_json::Value>()? {
            match element {
                serde_json::Value::String(s) => values.push(s),
                other => {
                    return Err(de::Error::custom(format!(
                        "unsupported audience element type: {other}"
                    )));
                }
            }
        }
        Ok(ClaimStrings(values))
    }
}

impl<'de> Deserialize<'de> for ClaimStrings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ClaimStringsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_date_truncates() {
        let t = UNIX_EPOCH + Duration::from_millis(1_700_000_000_750);
        let date = NumericDate::new(t);
        assert_eq!(date.as_secs(), 1_700_000_000);
    }

    #[test]
    fn test_numeric_date_roundtrip() {
        let date = NumericDate::from_secs(1_700_000_000);
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "1700000000");

        let back: NumericDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn test_numeric_date_accepts_fraction() {
        let date: NumericDate = serde_json::from_str("1700000000.75").unwrap();
        assert_eq!(date.as_secs(), 1_700_000_000);

        // Re-encoding a fractional decode emits the truncated value
        assert_eq!(serde_json::to_string(&date).unwrap(), "1700000000");
    }

    #[test]
    fn test_numeric_date_rejects_non_numbers() {
        let err = serde_json::from_str::<NumericDate>("\"soon\"").unwrap_err();
        assert!(err.to_string().contains("could not parse numeric date"));

        assert!(serde_json::from_str::<NumericDate>("[1]").is_err());
        assert!(serde_json::from_str::<NumericDate>("{}").is_err());
    }

    #[test]
    fn test_claim_strings_single_string() {
        let aud: ClaimStrings = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(aud.as_slice(), ["x".to_string()]);
    }

    #[test]
    fn test_claim_strings_array() {
        let aud: ClaimStrings = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(aud.as_slice(), ["x".to_string(), "y".to_string()]);

        // Both wire shapes normalize to the same sequence
        let single: ClaimStrings = serde_json::from_str("\"x\"").unwrap();
        let array: ClaimStrings = serde_json::from_str(r#"["x"]"#).unwrap();
        assert_eq!(single, array);
    }

    #[test]
    fn test_claim_strings_rejects_non_string_elements() {
        assert!(serde_json::from_str::<ClaimStrings>("[1]").is_err());
        assert!(serde_json::from_str::<ClaimStrings>(r#"["x",1]"#).is_err());
        assert!(serde_json::from_str::<ClaimStrings>("17").is_err());
    }

    #[test]
    fn test_claim_strings_null_is_unset() {
        let aud: ClaimStrings = serde_json::from_str("null").unwrap();
        assert!(aud.is_empty());
    }

    #[test]
    fn test_claim_strings_always_encodes_array() {
        let aud = ClaimStrings::from("x");
        assert_eq!(serde_json::to_string(&aud).unwrap(), r#"["x"]"#);
    }
}
