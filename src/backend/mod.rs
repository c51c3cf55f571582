pub mod http;
pub mod models;

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

use crate::store::models::RemoteSessionId;
use models::{QueryRequest, QueryResponse, StoreRequest};

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Remote Error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Remote { status: u16, detail: Option<String> },
    #[error("Decode Error: {0}")]
    Decode(String),
}

impl BackendError {
    /// Human readable detail the backend attached to a failed response.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Remote { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// The remote question-answering service plus the object storage it hands
/// out upload URLs for.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn create_session(&self) -> Result<RemoteSessionId, BackendError>;

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError>;

    /// Returns a mapping from filename to pre-signed upload URL.
    async fn presign_uploads(
        &self,
        session_id: &RemoteSessionId,
        filenames: &[String],
    ) -> Result<HashMap<String, String>, BackendError>;

    async fn upload_object(
        &self,
        url: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError>;

    async fn register_documents(&self, request: &StoreRequest) -> Result<(), BackendError>;
}
