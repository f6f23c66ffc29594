//! Key handling for Corsign tokens.
//!
//! Signed tokens use ECDSA P-256 (JWT `ES256`). Self-asserted tokens use an
//! HMAC secret (JWT `HS256`) that is usually the public default `"self"`, so
//! they prove nothing about who produced them.

use jsonwebtoken::{DecodingKey, EncodingKey};
use p256::{
    pkcs8::{spki, DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
    PublicKey, SecretKey,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::error::Error as StdError;
use std::fmt;

/// Default HMAC key for self-asserted tokens. Not a secret.
pub const SELF_ASSERTED_KEY: &str = "self";

/// Custom error type for key operations
#[derive(Debug)]
pub enum Error {
    /// PKCS#8 encoding/decoding error
    Pkcs8(p256::pkcs8::Error),
    /// SPKI encoding/decoding error
    Spki(spki::Error),
    /// Key rejected by the JWT backend
    Jwt(jsonwebtoken::errors::Error),
    /// Invalid key format
    InvalidKeyFormat,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pkcs8(e) => write!(f, "PKCS#8 error: {}", e),
            Error::Spki(e) => write!(f, "SPKI error: {}", e),
            Error::Jwt(e) => write!(f, "JWT key error: {}", e),
            Error::InvalidKeyFormat => write!(f, "Invalid key format"),
        }
    }
}

impl StdError for Error {}

impl From<p256::pkcs8::Error> for Error {
    fn from(err: p256::pkcs8::Error) -> Self {
        Error::Pkcs8(err)
    }
}

impl From<spki::Error> for Error {
    fn from(err: spki::Error) -> Self {
        Error::Spki(err)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Jwt(err)
    }
}

/// Key pair containing private and public keys in PEM format
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

/// Generate a new ECDSA P-256 signer key pair.
///
/// The private key is PKCS#8 PEM, the public key SPKI PEM, which is what
/// [`signing_key`] and [`verifying_key`] expect.
pub fn generate_key_pair() -> Result<KeyPair, Error> {
    let mut rng = OsRng;

    let secret_key = SecretKey::random(&mut rng);
    let public_key = secret_key.public_key();

    let private_key_pem = secret_key
        .to_pkcs8_pem(p256::pkcs8::LineEnding::LF)?
        .to_string();

    let public_key_pem = public_key.to_public_key_pem(p256::pkcs8::LineEnding::LF)?;

    Ok(KeyPair {
        private_key_pem,
        public_key_pem,
    })
}

/// Derive the SPKI PEM public key belonging to a PKCS#8 PEM private key.
pub fn public_key_pem_from_private(private_key_pem: &str) -> Result<String, Error> {
    let secret_key = SecretKey::from_pkcs8_pem(private_key_pem)?;
    Ok(secret_key
        .public_key()
        .to_public_key_pem(p256::pkcs8::LineEnding::LF)?)
}

/// Calculate the SHA-256 fingerprint of a public key, used as the JWT `kid`.
///
/// Returns `"sha256:<hex>"` over the DER encoding of the key.
pub fn calculate_key_id(public_key_pem: &str) -> Result<String, Error> {
    let public_key = PublicKey::from_public_key_pem(public_key_pem)?;
    let der_bytes = public_key.to_public_key_der()?;

    let mut hasher = Sha256::new();
    hasher.update(der_bytes.as_bytes());
    let hash = hasher.finalize();

    Ok(format!("sha256:{}", hex::encode(hash)))
}

/// Load an ES256 signing key from a PKCS#8 PEM private key.
pub fn signing_key(private_key_pem: &str) -> Result<EncodingKey, Error> {
    // Rejects curves other than P-256
    SecretKey::from_pkcs8_pem(private_key_pem)?;
    Ok(EncodingKey::from_ec_pem(private_key_pem.as_bytes())?)
}

/// Load an ES256 verifying key from an SPKI PEM public key.
pub fn verifying_key(public_key_pem: &str) -> Result<DecodingKey, Error> {
    PublicKey::from_public_key_pem(public_key_pem)?;
    Ok(DecodingKey::from_ec_pem(public_key_pem.as_bytes())?)
}

/// HMAC key for self-asserted tokens.
pub fn self_asserted_key(secret: &str) -> Result<EncodingKey, Error> {
    if secret.is_empty() {
        return Err(Error::InvalidKeyFormat);
    }
    Ok(EncodingKey::from_secret(secret.as_bytes()))
}
