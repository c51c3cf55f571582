use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::backend::models::{
    ErrorBody, QueryRequest, QueryResponse, StoreRequest, UploadDocsRequest, UploadDocsResponse,
};
use crate::backend::{BackendError, DocumentBackend};
use crate::store::models::RemoteSessionId;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turns a non-2xx response into [`BackendError::Remote`], keeping the
/// `detail` field when the body carries one.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.detail_text());

    debug!("Backend responded {}: {}", status, text);
    Err(BackendError::Remote {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl DocumentBackend for HttpBackend {
    async fn create_session(&self) -> Result<RemoteSessionId, BackendError> {
        let response = self
            .client
            .get(self.endpoint("createSession"))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let session: RemoteSessionId = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        info!("Created remote session {}", session);
        Ok(session)
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError> {
        debug!("Querying backend with tag {} in session {}", request.tag, request.session_id);
        let response = self
            .client
            .get(self.endpoint("query"))
            .query(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn presign_uploads(
        &self,
        session_id: &RemoteSessionId,
        filenames: &[String],
    ) -> Result<HashMap<String, String>, BackendError> {
        let body = UploadDocsRequest {
            session_id: session_id.to_string(),
            filenames: filenames.to_vec(),
        };

        let response = self
            .client
            .post(self.endpoint("uploadDocs"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let parsed: UploadDocsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(parsed.presigned_urls)
    }

    async fn upload_object(
        &self,
        url: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    async fn register_documents(&self, request: &StoreRequest) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("store"))
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        check_status(response).await?;
        info!("Registered documents for session {}", request.session_id);
        Ok(())
    }
}
