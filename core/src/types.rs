//! Domain DTOs for the notesheet backend.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently of the
//! mock-server crate; the integration tests catch schema drift. Identifier
//! fields are kept as strings even though the backend sometimes emits them as
//! JSON numbers (`sessionId` is a `long` server-side), so `lenient_string`
//! accepts either.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Login credentials. Only ever held for the duration of a login call.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "userName")]
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A server-issued session, as returned by `POST /session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(deserialize_with = "non_empty_string")]
    pub session_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub remaining_minutes: i64,
    #[serde(default)]
    pub cached: bool,
}

/// One document attached to a work item's attachment folder.
///
/// Values are passed through exactly as the service sent them.
/// `document_size` is a byte count encoded as a string, or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_index: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_size: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version_no: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Payload of `GET /supportingdocs/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub documents: Vec<SupportingDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Informational note, e.g. when the work item has no attachment folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Payload of `POST /notesheet/createpdfnote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfNoteResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_doc_index: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notedocument_index: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub new_version: String,
    #[serde(default)]
    pub pdf_path: String,
    #[serde(default)]
    pub comments_path: String,
    #[serde(default)]
    pub annotations_preserved: bool,
}

/// Query string shared by the two work-item endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CaseQuery<'a> {
    pub workitem_id: &'a str,
    pub process_instance_id: &'a str,
}

/// Accept a JSON string, number, or null where a string is expected.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// Like `lenient_string`, but a null or blank value is an error.
fn non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_string(deserializer)?;
    if value.trim().is_empty() {
        return Err(de::Error::custom("identifier must not be empty"));
    }
    Ok(value)
}
