use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Commonly used `testType` values. The field itself is free-form.
pub mod test_types {
    pub const PCR: &str = "pcr";
    pub const ANTIGEN: &str = "antigen";
}

/// Commonly used `vaccine` short names. The field itself is free-form.
pub mod vaccines {
    pub const BNT162B2: &str = "BNT162b2";
    pub const MRNA_1273: &str = "mRNA-1273";
}

/// Test and vaccination data plus optional third-party application data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Information {
    /// Whether the administered test was negative. `Some(false)` is a positive result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_negative: Option<bool>,
    /// Type of test used, e.g. `pcr` or `antigen`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vaccinated: Option<bool>,
    /// Short name of the administered vaccine, e.g. `BNT162b2`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_data: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_data1: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_data2: Option<BTreeMap<String, String>>,
    /// Test centre or practitioner that carried out the test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carried_out_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_type: Option<String>,
    /// Set by the issuer when the credential has been withdrawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_immune: Option<bool>,
}

impl Information {
    /// Information for a test result only.
    pub fn test_result(is_negative: bool, test_type: &str) -> Self {
        Self {
            is_negative: Some(is_negative),
            test_type: Some(test_type.to_string()),
            ..Self::default()
        }
    }
}
