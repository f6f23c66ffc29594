//! Business-rule validation of payloads at authoring time.
//!
//! Every entity has a fixed list of [`Rule`]s. A rule is a pure predicate
//! over the candidate plus the violation it reports. Evaluation never stops
//! at the first failure: the returned [`ValidationReport`] lists every
//! violated rule.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::types::information::Information;
use crate::types::payload::Payload;
use crate::types::person::{is_filled, Person};
use crate::types::token::{Token, SCHEMA_VERSION};

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `pld.person.city`
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Outcome of a schema validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation was reported for `field`.
    pub fn has_violation(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when valid, otherwise [`Error::Validation`] carrying this report.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }

    fn push(&mut self, field: String, code: &str, message: &str) {
        self.violations.push(Violation {
            field,
            code: code.to_string(),
            message: message.to_string(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{} ({}): {}", v.field, v.code, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Which person rule set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonSchema {
    /// Names and contact only.
    Standard,
    /// Standard rules plus a full address with at least one street line.
    PositiveTest,
}

/// A declarative rule: `holds` must return true for a valid candidate.
pub struct Rule<T> {
    pub field: &'static str,
    pub code: &'static str,
    pub message: &'static str,
    pub holds: fn(&T) -> bool,
}

fn evaluate<T>(rules: &[Rule<T>], candidate: &T, prefix: &str, report: &mut ValidationReport) {
    for rule in rules {
        if !(rule.holds)(candidate) {
            report.push(format!("{}{}", prefix, rule.field), rule.code, rule.message);
        }
    }
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]{2,}$").expect("email pattern is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9]+([0-9]|/|\(|\)|-| ){10,}$").expect("phone pattern is valid")
    })
}

fn country_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{2}$").expect("country pattern is valid"))
}

/// Absent or empty passes; otherwise `check` decides.
fn blank_or(value: &Option<String>, check: impl Fn(&str) -> bool) -> bool {
    match value.as_deref() {
        None | Some("") => true,
        Some(v) => check(v),
    }
}

/// Absent passes; present must be non-empty and satisfy `check`.
fn absent_or(value: &Option<String>, check: impl Fn(&str) -> bool) -> bool {
    match value.as_deref() {
        None => true,
        Some(v) => !v.is_empty() && check(v),
    }
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

fn firstname_filled(p: &Person) -> bool {
    !p.firstname.is_empty()
}

fn lastname_filled(p: &Person) -> bool {
    !p.lastname.is_empty()
}

fn email_format(p: &Person) -> bool {
    blank_or(&p.email, |v| email_regex().is_match(v))
}

fn phone_format(p: &Person) -> bool {
    blank_or(&p.phone_number, |v| phone_regex().is_match(v))
}

fn birthday_format(p: &Person) -> bool {
    absent_or(&p.birthday, is_date)
}

fn city_not_blank(p: &Person) -> bool {
    absent_or(&p.city, |_| true)
}

fn zip_not_blank(p: &Person) -> bool {
    absent_or(&p.zip, |_| true)
}

fn country_format(p: &Person) -> bool {
    absent_or(&p.country, |v| country_regex().is_match(v))
}

pub const PERSON_RULES: &[Rule<Person>] = &[
    Rule {
        field: "firstname",
        code: "REQUIRED",
        message: "firstname must not be empty",
        holds: firstname_filled,
    },
    Rule {
        field: "lastname",
        code: "REQUIRED",
        message: "lastname must not be empty",
        holds: lastname_filled,
    },
    Rule {
        field: "email",
        code: "INVALID_EMAIL",
        message: "email must be a valid email address",
        holds: email_format,
    },
    Rule {
        field: "phoneNumber",
        code: "INVALID_PHONE",
        message: "phoneNumber must contain at least 11 digits or separators",
        holds: phone_format,
    },
    Rule {
        field: "birthday",
        code: "INVALID_DATE",
        message: "birthday must be a YYYY-MM-DD date",
        holds: birthday_format,
    },
    Rule {
        field: "city",
        code: "BLANK",
        message: "city must not be empty when given",
        holds: city_not_blank,
    },
    Rule {
        field: "zip",
        code: "BLANK",
        message: "zip must not be empty when given",
        holds: zip_not_blank,
    },
    Rule {
        field: "country",
        code: "INVALID_COUNTRY",
        message: "country must be an ISO 3166 alpha-2 code",
        holds: country_format,
    },
    Rule {
        field: "email",
        code: "CONTACT_REQUIRED",
        message: "either email or phoneNumber is required",
        holds: Person::has_contact,
    },
];

fn city_filled(p: &Person) -> bool {
    is_filled(&p.city)
}

fn zip_filled(p: &Person) -> bool {
    is_filled(&p.zip)
}

fn country_filled(p: &Person) -> bool {
    is_filled(&p.country)
}

/// Address rules applied to people with a positive test result.
pub const ADDRESS_RULES: &[Rule<Person>] = &[
    Rule {
        field: "street1",
        code: "STREET_REQUIRED",
        message: "either street1 or street2 must be filled in",
        holds: Person::has_street,
    },
    Rule {
        field: "city",
        code: "ADDRESS_REQUIRED",
        message: "city is required",
        holds: city_filled,
    },
    Rule {
        field: "zip",
        code: "ADDRESS_REQUIRED",
        message: "zip is required",
        holds: zip_filled,
    },
    Rule {
        field: "country",
        code: "ADDRESS_REQUIRED",
        message: "country is required",
        holds: country_filled,
    },
];

// ---------------------------------------------------------------------------
// Information
// ---------------------------------------------------------------------------

fn vaccine_named(i: &Information) -> bool {
    i.is_vaccinated != Some(true) || is_filled(&i.vaccine)
}

pub const INFORMATION_RULES: &[Rule<Information>] = &[Rule {
    field: "vaccine",
    code: "VACCINE_REQUIRED",
    message: "vaccine is required when isVaccinated is true",
    holds: vaccine_named,
}];

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

fn positive_has_street(p: &Payload) -> bool {
    !p.is_positive_result() || p.person.has_street()
}

fn positive_has_city(p: &Payload) -> bool {
    !p.is_positive_result() || city_filled(&p.person)
}

fn positive_has_zip(p: &Payload) -> bool {
    !p.is_positive_result() || zip_filled(&p.person)
}

fn positive_has_country(p: &Payload) -> bool {
    !p.is_positive_result() || country_filled(&p.person)
}

const POSITIVE_ADDRESS_MESSAGE: &str = "a positive test result requires the person's address";

/// Cross-entity rules; per-entity rules are applied under `person.` and `information.`.
pub const PAYLOAD_RULES: &[Rule<Payload>] = &[
    Rule {
        field: "person.street1",
        code: "ADDRESS_REQUIRED_ON_POSITIVE",
        message: POSITIVE_ADDRESS_MESSAGE,
        holds: positive_has_street,
    },
    Rule {
        field: "person.city",
        code: "ADDRESS_REQUIRED_ON_POSITIVE",
        message: POSITIVE_ADDRESS_MESSAGE,
        holds: positive_has_city,
    },
    Rule {
        field: "person.zip",
        code: "ADDRESS_REQUIRED_ON_POSITIVE",
        message: POSITIVE_ADDRESS_MESSAGE,
        holds: positive_has_zip,
    },
    Rule {
        field: "person.country",
        code: "ADDRESS_REQUIRED_ON_POSITIVE",
        message: POSITIVE_ADDRESS_MESSAGE,
        holds: positive_has_country,
    },
];

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

fn issuer_filled(t: &Token) -> bool {
    !t.iss.is_empty()
}

fn audience_filled(t: &Token) -> bool {
    !t.aud.is_empty()
}

fn version_supported(t: &Token) -> bool {
    t.schema_version() == SCHEMA_VERSION
}

pub const TOKEN_RULES: &[Rule<Token>] = &[
    Rule {
        field: "iss",
        code: "REQUIRED",
        message: "iss must not be empty",
        holds: issuer_filled,
    },
    Rule {
        field: "aud",
        code: "REQUIRED",
        message: "aud must not be empty",
        holds: audience_filled,
    },
    Rule {
        field: "ver",
        code: "UNSUPPORTED_VERSION",
        message: "unsupported schema version",
        holds: version_supported,
    },
];

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn validate_person(person: &Person, schema: PersonSchema) -> ValidationReport {
    let mut report = ValidationReport::default();
    evaluate(PERSON_RULES, person, "", &mut report);
    if schema == PersonSchema::PositiveTest {
        evaluate(ADDRESS_RULES, person, "", &mut report);
    }
    report
}

pub fn validate_information(information: &Information) -> ValidationReport {
    let mut report = ValidationReport::default();
    evaluate(INFORMATION_RULES, information, "", &mut report);
    report
}

fn evaluate_payload(payload: &Payload, prefix: &str, report: &mut ValidationReport) {
    evaluate(PERSON_RULES, &payload.person, &format!("{}person.", prefix), report);
    if let Some(information) = &payload.information {
        evaluate(INFORMATION_RULES, information, &format!("{}information.", prefix), report);
    }
    evaluate(PAYLOAD_RULES, payload, prefix, report);
}

pub fn validate_payload(payload: &Payload) -> ValidationReport {
    let mut report = ValidationReport::default();
    evaluate_payload(payload, "", &mut report);
    report
}

pub fn validate_token(token: &Token) -> ValidationReport {
    let mut report = ValidationReport::default();
    evaluate(TOKEN_RULES, token, "", &mut report);
    evaluate_payload(&token.pld, "pld.", &mut report);
    report
}

/// Validate a JSON payload that has not been typed yet.
///
/// Type-level rules (required names, `sex` values, booleans, string maps)
/// are checked by deserialising; a type failure yields a single
/// `TYPE_MISMATCH` violation at `$`.
pub fn validate_payload_json(value: &Value) -> ValidationReport {
    match Payload::deserialize(value) {
        Ok(payload) => validate_payload(&payload),
        Err(e) => {
            let mut report = ValidationReport::default();
            report.push("$".to_string(), "TYPE_MISMATCH", &e.to_string());
            report
        }
    }
}
