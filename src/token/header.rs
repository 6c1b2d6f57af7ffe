use serde::{Deserialize, Serialize};

/// The JOSE header of a token
///
/// Field order matters on the wire: issued headers serialize exactly as
/// `{"typ":"JWT","alg":"<name>"}`. `alg` stays optional so a header without
/// one decodes cleanly and surfaces as unverifiable rather than malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Token type ("typ"), `"JWT"` for issued tokens
    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Algorithm name ("alg") of the signing method
    #[serde(rename = "alg", default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    /// Key id ("kid"), for callers that select verification keys by id
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

impl TokenHeader {
    /// A JWT header naming the given algorithm
    pub fn new(algorithm: &str) -> Self {
        Self {
            token_type: Some("JWT".to_string()),
            algorithm: Some(algorithm.to_string()),
            key_id: None,
        }
    }

    /// The algorithm name, if present
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// The key id, if present
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }
}
