//! Shape checks for decoded, untrusted token claims.
//!
//! These guards answer "can this value be read as a Corsign token" and
//! nothing more. They look only at presence and primitive JSON types; the
//! business rules in [`crate::schema`] are deliberately not consulted, and a
//! value passing here says nothing about who signed it.
//!
//! A present field of the wrong type is always a rejection, whether the
//! field is required or optional. JSON `null` counts as present.
//!
//! Object-typed fields such as `appData` accept only JSON objects: `null`
//! and arrays are rejected, which is stricter than a JavaScript `typeof`.

use serde_json::{Map, Value};

/// Token claims: `sub`, `exp`, `iat`, `nbf`, `ver`, `iss`, `aud`, `pld`.
pub fn has_format_of_token(value: &Value) -> bool {
    let Some(token) = value.as_object() else {
        return false;
    };

    optional(token, "sub", Value::is_string)
        && optional(token, "exp", Value::is_number)
        && optional(token, "iat", Value::is_number)
        && optional(token, "nbf", Value::is_number)
        && optional(token, "ver", Value::is_string)
        && required(token, "iss", Value::is_string)
        && required(token, "aud", Value::is_string)
        && required(token, "pld", has_format_of_payload)
}

/// Payload: a `person` and an optional `information` block.
pub fn has_format_of_payload(value: &Value) -> bool {
    let Some(payload) = value.as_object() else {
        return false;
    };

    required(payload, "person", has_format_of_person)
        && optional(payload, "information", has_format_of_information)
}

pub fn has_format_of_person(value: &Value) -> bool {
    let Some(person) = value.as_object() else {
        return false;
    };

    optional(person, "idCardNumber", Value::is_string)
        && required(person, "firstname", Value::is_string)
        && required(person, "lastname", Value::is_string)
        && optional(person, "sex", is_sex)
        && optional(person, "birthday", Value::is_string)
        && optional(person, "email", Value::is_string)
        && optional(person, "phoneNumber", Value::is_string)
        && optional(person, "street1", Value::is_string)
        && optional(person, "street2", Value::is_string)
        && optional(person, "city", Value::is_string)
        && optional(person, "zip", Value::is_string)
        && optional(person, "country", Value::is_string)
}

pub fn has_format_of_information(value: &Value) -> bool {
    let Some(information) = value.as_object() else {
        return false;
    };

    optional(information, "isNegative", Value::is_boolean)
        && optional(information, "testType", Value::is_string)
        && optional(information, "isVaccinated", Value::is_boolean)
        && optional(information, "vaccine", Value::is_string)
        && optional(information, "appData", Value::is_object)
        && optional(information, "appData1", Value::is_object)
        && optional(information, "appData2", Value::is_object)
        && optional(information, "carriedOutBy", Value::is_string)
        && optional(information, "creatorType", Value::is_string)
        && optional(information, "invalid", Value::is_boolean)
        && optional(information, "testName", Value::is_string)
        && optional(information, "testManufacturer", Value::is_string)
        && optional(information, "testId", Value::is_string)
        && optional(information, "isImmune", Value::is_boolean)
}

fn is_sex(value: &Value) -> bool {
    matches!(value.as_str(), Some("F" | "M" | "D"))
}

fn required(object: &Map<String, Value>, key: &str, check: fn(&Value) -> bool) -> bool {
    object.get(key).map_or(false, check)
}

fn optional(object: &Map<String, Value>, key: &str, check: fn(&Value) -> bool) -> bool {
    object.get(key).map_or(true, check)
}
