use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_THREAD_LABEL: &str = "New chat";

pub type ThreadId = Uuid;

/// Opaque identifier the backend issues to correlate a thread with its
/// uploaded documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RemoteSessionId(String);

impl RemoteSessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// `/createSession` answers either `"abc"` or `{"session_id": "abc"}`.
impl<'de> Deserialize<'de> for RemoteSessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Plain(String),
            Wrapped { session_id: String },
        }

        match Wire::deserialize(deserializer)? {
            Wire::Plain(id) | Wire::Wrapped { session_id: id } => Ok(Self(id)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
    Error,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::User => "user",
            Origin::Assistant => "assistant",
            Origin::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub origin: Origin,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_session_id: Option<RemoteSessionId>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(remote_session_id: Option<RemoteSessionId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: DEFAULT_THREAD_LABEL.to_string(),
            remote_session_id,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_default_label(&self) -> bool {
        self.label == DEFAULT_THREAD_LABEL
    }
}

/// Partial update for [`Thread`] metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadPatch {
    pub label: Option<String>,
    pub remote_session_id: Option<RemoteSessionId>,
}

impl ThreadPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn remote_session_id(id: RemoteSessionId) -> Self {
        Self {
            remote_session_id: Some(id),
            ..Default::default()
        }
    }
}
