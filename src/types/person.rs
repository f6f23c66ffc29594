use serde::{Deserialize, Serialize};

/// Sex of a [`Person`]: Female, Male or Diverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "D")]
    Diverse,
}

/// Personally identifiable information carried in a payload.
///
/// Either `email` or `phone_number` is required for a payload to pass the
/// schema rules; the type itself only enforces `firstname` and `lastname`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// National ID card number, e.g. `LFC123ABC`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_card_number: Option<String>,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    /// ISO 3166 alpha-2 country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Person {
    /// Create a person with only the required names set.
    pub fn new(firstname: &str, lastname: &str) -> Self {
        Self {
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            ..Self::default()
        }
    }

    /// True when a non-empty email or phone number is present.
    pub fn has_contact(&self) -> bool {
        is_filled(&self.email) || is_filled(&self.phone_number)
    }

    /// True when `street1` or `street2` is present and non-empty.
    pub fn has_street(&self) -> bool {
        is_filled(&self.street1) || is_filled(&self.street2)
    }
}

/// Present and not the empty string.
pub(crate) fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.is_empty())
}
