use serde::{Deserialize, Serialize};

use super::information::Information;
use super::person::Person;

/// One person plus optional test/vaccination information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub person: Person,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<Information>,
}

impl Payload {
    /// Payload with no information block.
    pub fn new(person: Person) -> Self {
        Self {
            person,
            information: None,
        }
    }

    pub fn with_information(person: Person, information: Information) -> Self {
        Self {
            person,
            information: Some(information),
        }
    }

    /// True only when information is present and `isNegative` is explicitly `false`.
    pub fn is_positive_result(&self) -> bool {
        matches!(
            self.information,
            Some(Information {
                is_negative: Some(false),
                ..
            })
        )
    }
}
