use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::decode_unverified;
use crate::crypto;
use crate::error::{Error, ErrorCode};
use crate::structure::has_format_of_token;
use crate::types::token::Token;

/// A token read from untrusted input whose signature has not been checked.
///
/// Its shape matched the token contract, so fields are safe to read, but
/// nothing is known about who produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedToken(Token);

impl UnverifiedToken {
    pub fn token(&self) -> &Token {
        &self.0
    }

    pub fn into_inner(self) -> Token {
        self.0
    }
}

/// Decode an encoded token and gate it through the structural check.
///
/// 1. Decode the JWT claims ([`Error::Decoding`] on failure)
/// 2. Check the claims against the token shape ([`Error::MalformedCredential`])
/// 3. Type the claims
pub fn read_unverified(encoded: &str) -> Result<UnverifiedToken, Error> {
    let claims = decode_unverified(encoded)?;
    let token = typed_token(claims)?;
    tracing::debug!(issuer = %token.iss, "read unverified token");
    Ok(UnverifiedToken(token))
}

fn typed_token(claims: Value) -> Result<Token, Error> {
    if !has_format_of_token(&claims) {
        tracing::warn!("decoded claims do not have the shape of a Corsign token");
        return Err(Error::MalformedCredential(
            "decoded claims do not match the token format".to_string(),
        ));
    }
    serde_json::from_value(claims).map_err(|e| Error::MalformedCredential(e.to_string()))
}

/// Structured verification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VerificationResult {
    pub fn success(token: Token, key_id: &str) -> Self {
        Self {
            valid: true,
            token: Some(token),
            key_id: Some(key_id.to_string()),
            error_code: None,
            error_message: None,
        }
    }

    pub fn failure(code: ErrorCode, message: &str) -> Self {
        Self {
            valid: false,
            token: None,
            key_id: None,
            error_code: Some(code),
            error_message: Some(message.to_string()),
        }
    }
}

/// Verify an ES256 token locally against the signer's public key.
///
/// Steps:
/// 1. Load the public key and compute its key id
/// 2. Read the JWT header; a `kid` naming a different key fails
/// 3. Verify the signature, `exp` and `nbf`
/// 4. Gate the claims through the structural check and type them
///
/// Self-asserted (HS256) tokens always fail here.
pub fn verify_token_offline(encoded: &str, public_key_pem: &str) -> VerificationResult {
    // Step 1: Load key
    let (key, key_id) = match crypto::verifying_key(public_key_pem)
        .and_then(|key| crypto::calculate_key_id(public_key_pem).map(|id| (key, id)))
    {
        Ok(v) => v,
        Err(e) => {
            return VerificationResult::failure(
                ErrorCode::KeyInvalid,
                &format!("Failed to load public key: {}", e),
            )
        }
    };

    // Step 2: Header
    let header = match decode_header(encoded) {
        Ok(h) => h,
        Err(e) => {
            return VerificationResult::failure(
                ErrorCode::TokenNotDecodable,
                &format!("Failed to decode token header: {}", e),
            )
        }
    };
    if header.alg != Algorithm::ES256 {
        return VerificationResult::failure(
            ErrorCode::SignatureInvalid,
            &format!("Algorithm {:?} is not accepted for signed tokens", header.alg),
        );
    }
    if let Some(kid) = &header.kid {
        if kid != &key_id {
            return VerificationResult::failure(
                ErrorCode::SignatureInvalid,
                &format!("Token was signed by key {}, not {}", kid, key_id),
            );
        }
    }

    // Step 3: Signature
    let mut validation = Validation::new(Algorithm::ES256);
    validation.validate_aud = false;
    validation.validate_nbf = true;
    validation.required_spec_claims.clear();

    let claims = match decode::<Value>(encoded, &key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::ExpiredSignature => ErrorCode::TokenExpired,
                ErrorKind::ImmatureSignature => ErrorCode::TokenNotYetValid,
                ErrorKind::InvalidSignature => ErrorCode::SignatureInvalid,
                _ => ErrorCode::TokenNotDecodable,
            };
            return VerificationResult::failure(code, &format!("Token rejected: {}", e));
        }
    };

    // Step 4: Shape
    match typed_token(claims) {
        Ok(token) => VerificationResult::success(token, &key_id),
        Err(e) => VerificationResult::failure(ErrorCode::TokenMalformed, &e.to_string()),
    }
}
