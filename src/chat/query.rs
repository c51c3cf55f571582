use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::models::QueryRequest;
use crate::backend::{BackendError, DocumentBackend};
use crate::store::models::RemoteSessionId;

pub const GENERIC_FAILURE: &str = "Something went wrong!";
pub const EMPTY_ANSWER: &str = "No response message";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Remote Error {status}: {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE))]
    Remote { status: u16, detail: Option<String> },
    #[error("Invalid Response: {0}")]
    InvalidResponse(String),
}

impl QueryError {
    /// Text shown in the transcript for a failed question.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::Remote {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<BackendError> for QueryError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(e) => QueryError::Network(e),
            BackendError::Remote { status, detail } => QueryError::Remote { status, detail },
            BackendError::Decode(e) => QueryError::InvalidResponse(e),
        }
    }
}

/// Sends one utterance to the backend and returns the generated answer.
/// Exactly one request is made; there is no retry.
pub async fn ask(
    backend: &dyn DocumentBackend,
    utterance: &str,
    tag: &str,
    session_id: &RemoteSessionId,
) -> Result<String, QueryError> {
    let request = QueryRequest {
        query: utterance.to_string(),
        tag: tag.to_string(),
        session_id: session_id.to_string(),
    };

    let response = backend.query(&request).await.map_err(|e| {
        warn!("Query failed in session {}: {}", session_id, e);
        QueryError::from(e)
    })?;

    let answer = response
        .generated_text
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| EMPTY_ANSWER.to_string());

    debug!("Received {} bytes of answer", answer.len());
    Ok(answer)
}
