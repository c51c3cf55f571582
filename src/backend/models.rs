use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub tag: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub generated_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadDocsRequest {
    pub session_id: String,
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadDocsResponse {
    #[serde(default)]
    pub presigned_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreRequest {
    pub session_id: String,
    pub tag: String,
    pub yt_list: Vec<String>,
}

/// Error payload of the backend, `{"detail": ...}`. Validation failures send
/// a list of objects instead of a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
