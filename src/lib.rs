//! # Corsign
//!
//! Portable health-credential tokens: who a person is, plus their test or
//! vaccination status, packed into a compact JWT.
//!
//! The crate has two independent validation layers:
//!
//! - [`schema`]: business rules checked when a payload is authored or
//!   signed (contact required, address required for positive results,
//!   street line required). Returns every violation at once.
//! - [`structure`]: shape checks for claims decoded from untrusted input,
//!   before anything is read from them. Knows nothing about the business
//!   rules and nothing about signatures.
//!
//! ## Quick Start
//!
//! ```rust
//! use corsign::codec::{decode_unverified, issue_unsigned};
//! use corsign::schema::{validate_person, PersonSchema};
//! use corsign::structure::has_format_of_token;
//! use corsign::types::person::Person;
//!
//! let mut person = Person::new("Max", "Mustermann");
//! person.email = Some("max@mustermann.de".to_string());
//! assert!(validate_person(&person, PersonSchema::Standard).is_valid());
//!
//! // Self-asserted: anyone can produce this token, it proves nothing
//! let token = issue_unsigned(&person, "my-app", None).unwrap();
//!
//! let claims = decode_unverified(token.as_str()).unwrap();
//! assert!(has_format_of_token(&claims));
//! ```
//!
//! ## Trust levels
//!
//! - [`codec::SelfAssertedToken`]: HMAC with a public default key, no authenticity
//! - [`codec::SignedToken`]: ES256 with the signer's P-256 key
//! - [`verification::UnverifiedToken`]: decoded and shape-checked, signature unknown
//! - [`verification::verify_token_offline`]: signature checked against a known public key
//!
//! With the `fetch` feature, [`client::HttpCredentialClient`] talks to the
//! remote Corsign service for signing and validation.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod endpoints;
pub mod error;
pub mod schema;
pub mod structure;
pub mod verification;

#[cfg(feature = "fetch")]
pub mod client;

pub mod types {
    pub mod information;
    pub mod payload;
    pub mod person;
    pub mod token;
}

pub use error::{Error, ErrorCode};
