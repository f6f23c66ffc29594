//! Encoding Corsign tokens as compact JWTs and reading them back.
//!
//! Two issuing paths exist and produce different types:
//!
//! - [`issue_unsigned`] returns a [`SelfAssertedToken`]. It is HMAC-signed
//!   with a key that defaults to the well-known string `"self"`, so anyone
//!   can produce or alter one. It carries no authenticity whatsoever.
//! - [`issue_signed`] returns a [`SignedToken`], an ES256 JWT made with the
//!   signer's P-256 private key, verifiable with
//!   [`crate::verification::verify_token_offline`].
//!
//! [`decode_unverified`] only recovers the claims. Its output must go through
//! [`crate::structure::has_format_of_token`] before any field is used.

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};
use serde_json::Value;

use crate::crypto::{self, SELF_ASSERTED_KEY};
use crate::error::Error;
use crate::schema::validate_payload;
use crate::types::payload::Payload;
use crate::types::person::Person;
use crate::types::token::Token;

/// Encoded token with no authenticity guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfAssertedToken(String);

impl SelfAssertedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SelfAssertedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encoded token signed with a signer's P-256 key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    encoded: String,
    key_id: String,
}

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// `sha256:` fingerprint of the signer's public key, also the JWT `kid`.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn into_string(self) -> String {
        self.encoded
    }
}

impl AsRef<str> for SignedToken {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

/// Issue a self-asserted token for `person`.
///
/// The payload carries no information block and `aud` is `"self"`. `key`
/// defaults to [`SELF_ASSERTED_KEY`]. The person is not schema-validated.
pub fn issue_unsigned(
    person: &Person,
    issuer: &str,
    key: Option<&str>,
) -> Result<SelfAssertedToken, Error> {
    let mut token = Token::self_asserted(person.clone(), issuer);
    token.iat = Some(Utc::now().timestamp());

    let key = crypto::self_asserted_key(key.unwrap_or(SELF_ASSERTED_KEY))?;
    let encoded = encode(&Header::new(Algorithm::HS256), &token, &key)
        .map_err(|e| Error::Signing(e.to_string()))?;

    tracing::debug!(issuer, "issued self-asserted token");
    Ok(SelfAssertedToken(encoded))
}

/// Validate `payload` and sign it as an ES256 token.
///
/// Fails with [`Error::Validation`] before any signing if the payload breaks
/// a schema rule.
pub fn issue_signed(
    payload: &Payload,
    issuer: &str,
    audience: &str,
    private_key_pem: &str,
) -> Result<SignedToken, Error> {
    validate_payload(payload).into_result()?;

    let mut token = Token::new(issuer, audience, payload.clone());
    token.iat = Some(Utc::now().timestamp());
    sign_token(&token, private_key_pem)
}

/// Sign an already assembled token as ES256 without schema validation.
///
/// Use this when `sub`, `exp` or `nbf` need to be set by the caller.
pub fn sign_token(token: &Token, private_key_pem: &str) -> Result<SignedToken, Error> {
    let key = crypto::signing_key(private_key_pem)?;
    let public_key_pem = crypto::public_key_pem_from_private(private_key_pem)?;
    let key_id = crypto::calculate_key_id(&public_key_pem)?;

    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(key_id.clone());

    let encoded = encode(&header, token, &key).map_err(|e| Error::Signing(e.to_string()))?;

    tracing::debug!(issuer = %token.iss, kid = %key_id, "issued signed token");
    Ok(SignedToken { encoded, key_id })
}

/// Recover the claims of a compact JWT without checking its signature.
///
/// Only the JWT framing is checked: three dot-separated base64url segments
/// whose first two decode to JSON objects.
pub fn decode_unverified(encoded: &str) -> Result<Value, Error> {
    let parts: Vec<&str> = encoded.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(Error::Decoding(format!(
            "expected 3 JWT segments, found {}",
            parts.len()
        )));
    }

    let header = decode_segment(parts[0])?;
    if !header.is_object() {
        return Err(Error::Decoding("JWT header is not a JSON object".to_string()));
    }

    let claims = decode_segment(parts[1])?;
    if !claims.is_object() {
        return Err(Error::Decoding("JWT claims are not a JSON object".to_string()));
    }

    Ok(claims)
}

fn decode_segment(segment: &str) -> Result<Value, Error> {
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| Error::Decoding(format!("invalid base64url segment: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Decoding(format!("invalid JSON segment: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key_pair;
    use crate::structure::has_format_of_token;
    use crate::types::information::Information;
    use crate::types::person::Sex;

    fn max() -> Person {
        Person {
            sex: Some(Sex::Male),
            birthday: Some("2020-04-21".to_string()),
            phone_number: Some("+49 123 456 78".to_string()),
            ..Person::new("Max", "Mustermann")
        }
    }

    fn decoded_person(claims: &Value) -> Person {
        serde_json::from_value(claims["pld"]["person"].clone()).unwrap()
    }

    #[test]
    fn test_unsigned_roundtrip() {
        let person = max();
        let token = issue_unsigned(&person, "corsign-test", None).unwrap();
        let claims = decode_unverified(token.as_str()).unwrap();

        assert!(has_format_of_token(&claims));
        assert_eq!(decoded_person(&claims), person);
        assert_eq!(claims["iss"], "corsign-test");
        assert_eq!(claims["aud"], "self");
        assert_eq!(claims["ver"], "2");
        assert!(claims["iat"].is_i64());
        assert!(claims["pld"].get("information").is_none());
    }

    #[test]
    fn test_unsigned_roundtrip_minimal_person() {
        // Structurally valid but schema-invalid people are still issued
        let person = Person::new("", "");
        let token = issue_unsigned(&person, "", Some("another-key")).unwrap();
        let claims = decode_unverified(token.as_str()).unwrap();
        assert_eq!(decoded_person(&claims), person);
    }

    #[test]
    fn test_unsigned_roundtrip_every_person_field() {
        let person = Person {
            id_card_number: Some("LFC123ABC".to_string()),
            firstname: "Erika".to_string(),
            lastname: "Mustermann".to_string(),
            sex: Some(Sex::Diverse),
            birthday: Some("1964-08-12".to_string()),
            email: Some("erika@mustermann.de".to_string()),
            phone_number: Some("+49 (0)30 123456-78".to_string()),
            street1: Some("Heidestraße 17".to_string()),
            street2: Some("Hinterhaus".to_string()),
            city: Some("Köln".to_string()),
            zip: Some("51147".to_string()),
            country: Some("DE".to_string()),
        };
        let token = issue_unsigned(&person, "corsign-test", None).unwrap();
        let claims = decode_unverified(token.as_str()).unwrap();

        assert!(has_format_of_token(&claims));
        assert_eq!(claims["pld"]["person"].as_object().unwrap().len(), 12);
        assert_eq!(decoded_person(&claims), person);
    }

    #[test]
    fn test_unsigned_rejects_empty_key() {
        let result = issue_unsigned(&max(), "corsign-test", Some(""));
        assert!(matches!(result, Err(Error::InvalidKeyFormat)));
    }

    #[test]
    fn test_unsigned_header_is_hs256() {
        let token = issue_unsigned(&max(), "corsign-test", None).unwrap();
        let header = decode_segment(token.as_str().split('.').next().unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
    }

    #[test]
    fn test_signed_roundtrip() {
        let kp = generate_key_pair().unwrap();
        let info = Information::test_result(true, "antigen");
        let payload = Payload::with_information(max(), info);

        let token = issue_signed(&payload, "lab.example", "sormas", &kp.private_key_pem).unwrap();
        assert!(token.key_id().starts_with("sha256:"));

        let claims = decode_unverified(token.as_str()).unwrap();
        assert!(has_format_of_token(&claims));
        let decoded: Token = serde_json::from_value(claims).unwrap();
        assert_eq!(decoded.pld, payload);
        assert_eq!(decoded.aud, "sormas");
    }

    #[test]
    fn test_signed_header_carries_kid() {
        let kp = generate_key_pair().unwrap();
        let token = issue_signed(&Payload::new(max()), "lab.example", "self", &kp.private_key_pem)
            .unwrap();
        let header = decode_segment(token.as_str().split('.').next().unwrap()).unwrap();
        assert_eq!(header["alg"], "ES256");
        assert_eq!(header["kid"], token.key_id());
    }

    #[test]
    fn test_signed_rejects_invalid_payload() {
        let kp = generate_key_pair().unwrap();
        let payload = Payload::with_information(max(), Information::test_result(false, "pcr"));
        let result = issue_signed(&payload, "lab.example", "self", &kp.private_key_pem);
        match result {
            Err(Error::Validation(report)) => assert!(report.has_violation("person.street1")),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_signed_rejects_bad_key() {
        let result = issue_signed(&Payload::new(max()), "lab.example", "self", "not-a-key");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(decode_unverified(""), Err(Error::Decoding(_))));
        assert!(matches!(decode_unverified("a.b"), Err(Error::Decoding(_))));
        assert!(matches!(
            decode_unverified("!!!.???.sig"),
            Err(Error::Decoding(_))
        ));

        let not_json = general_purpose::URL_SAFE_NO_PAD.encode("not json");
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        assert!(matches!(
            decode_unverified(&format!("{}.{}.sig", header, not_json)),
            Err(Error::Decoding(_))
        ));

        let array = general_purpose::URL_SAFE_NO_PAD.encode("[1,2]");
        assert!(matches!(
            decode_unverified(&format!("{}.{}.sig", header, array)),
            Err(Error::Decoding(_))
        ));
    }

    #[test]
    fn test_decode_does_not_check_shape() {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let claims = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"iss":1}"#);
        let value = decode_unverified(&format!("{}.{}.", header, claims)).unwrap();
        assert!(!has_format_of_token(&value));
    }
}
