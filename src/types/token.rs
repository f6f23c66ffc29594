use serde::{Deserialize, Serialize};

use super::payload::Payload;
use super::person::Person;

/// Wire schema version written into the `ver` claim of every issued token.
pub const SCHEMA_VERSION: &str = "2";

/// Audience used for self-asserted tokens.
pub const SELF_AUDIENCE: &str = "self";

/// The signable Corsign envelope.
///
/// Timestamps are JWT NumericDate values (seconds since the Unix epoch).
/// No ordering between `nbf`, `iat` and `exp` is enforced anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Stable subject identifier, reused across repeated tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Schema version; absent means [`SCHEMA_VERSION`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
    pub iss: String,
    /// Free text controlled by the signer
    pub aud: String,
    pub pld: Payload,
}

impl Token {
    pub fn new(issuer: &str, audience: &str, payload: Payload) -> Self {
        Self {
            sub: None,
            exp: None,
            iat: None,
            nbf: None,
            ver: Some(SCHEMA_VERSION.to_string()),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            pld: payload,
        }
    }

    /// Minimal envelope for a self-asserted token: person only, `aud = "self"`.
    pub fn self_asserted(person: Person, issuer: &str) -> Self {
        Self::new(issuer, SELF_AUDIENCE, Payload::new(person))
    }

    /// Schema version this token claims, defaulting to [`SCHEMA_VERSION`].
    pub fn schema_version(&self) -> &str {
        self.ver.as_deref().unwrap_or(SCHEMA_VERSION)
    }
}
