use thiserror::Error;

use crate::schema::ValidationReport;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("PKCS8 error: {0}")]
    Pkcs8(String),

    #[error("SPKI error: {0}")]
    Spki(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key format")]
    InvalidKeyFormat,

    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "fetch")]
    #[error("Remote service returned HTTP {status}: {errors}")]
    Remote {
        status: u16,
        errors: serde_json::Value,
    },
}

impl From<crate::crypto::Error> for Error {
    fn from(err: crate::crypto::Error) -> Self {
        match err {
            crate::crypto::Error::Pkcs8(e) => Error::Pkcs8(e.to_string()),
            crate::crypto::Error::Spki(e) => Error::Spki(e.to_string()),
            crate::crypto::Error::Jwt(e) => Error::Crypto(e.to_string()),
            crate::crypto::Error::InvalidKeyFormat => Error::InvalidKeyFormat,
        }
    }
}

/// Error codes for structured verification results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "SIGNATURE_INVALID")]
    SignatureInvalid,
    #[serde(rename = "KEY_INVALID")]
    KeyInvalid,
    #[serde(rename = "TOKEN_EXPIRED")]
    TokenExpired,
    #[serde(rename = "TOKEN_NOT_YET_VALID")]
    TokenNotYetValid,
    #[serde(rename = "TOKEN_NOT_DECODABLE")]
    TokenNotDecodable,
    #[serde(rename = "TOKEN_MALFORMED")]
    TokenMalformed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::SignatureInvalid => "SIGNATURE_INVALID",
            ErrorCode::KeyInvalid => "KEY_INVALID",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            ErrorCode::TokenNotDecodable => "TOKEN_NOT_DECODABLE",
            ErrorCode::TokenMalformed => "TOKEN_MALFORMED",
        };
        write!(f, "{}", s)
    }
}
