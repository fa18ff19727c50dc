use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Payload = BTreeMap<String, String>;

/// Field name to ordered messages. A field missing here, or mapped to an
/// empty list, is valid.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub verified: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}
