use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Acknowledgement of a create call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// Paging and filter parameters of a list call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// Value for the kind's filter parameter (`date` or `category`).
    pub filter: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    pub fn first_page(limit: u32) -> Self {
        Self {
            filter: None,
            page: 1,
            limit,
        }
    }

    pub fn with_filter(mut self, value: impl Into<String>) -> Self {
        self.filter = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user: Option<ProfileUser>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

/// Pull the records out of a list response.
///
/// Accepts a bare array, or an object holding the array under `collection_key`
/// or `entries`.
pub(crate) fn parse_page<R: DeserializeOwned>(body: Value, collection_key: &str) -> Result<Vec<R>, String> {
    let records = match body {
        Value::Array(records) => Value::Array(records),
        Value::Object(mut map) => match map.remove(collection_key).or_else(|| map.remove("entries")) {
            Some(records @ Value::Array(_)) => records,
            Some(_) => return Err(format!("'{collection_key}' is not a list")),
            None => return Err(format!("response has neither '{collection_key}' nor 'entries'")),
        },
        Value::Null => return Ok(Vec::new()),
        other => return Err(format!("unexpected list response: {other}")),
    };
    serde_json::from_value(records).map_err(|e| e.to_string())
}
