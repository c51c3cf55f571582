pub mod file;

use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::backend::models::StoreRequest;
use crate::backend::{BackendError, DocumentBackend};
use crate::store::models::RemoteSessionId;

pub use file::{content_type_for, UploadFile};

/// Files bound for one remote session. Lives only for one upload.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub session_id: RemoteSessionId,
    pub files: Vec<UploadFile>,
}

#[derive(Debug)]
pub struct FailedUpload {
    pub filename: String,
    pub reason: BackendError,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No files to upload")]
    EmptyBatch,
    #[error("File {0} appears more than once in the batch")]
    DuplicateFilename(String),
    #[error("Failed to obtain upload URLs: {0}")]
    Presign(#[source] BackendError),
    #[error("Backend returned no upload URL for {0}")]
    MissingUrl(String),
    #[error("{}", upload_summary(.failed, .succeeded))]
    Upload {
        failed: Vec<FailedUpload>,
        succeeded: usize,
    },
    #[error("Failed to register documents: {0}")]
    Register(#[source] BackendError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn upload_summary(failed: &[FailedUpload], succeeded: &usize) -> String {
    let names = failed
        .iter()
        .map(|f| f.filename.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} of {} uploads failed: {}",
        failed.len(),
        failed.len() + succeeded,
        names
    )
}

/// Drives presign, upload and registration for one batch.
pub struct UploadOrchestrator {
    backend: Arc<dyn DocumentBackend>,
}

impl UploadOrchestrator {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Uploads every file in `batch` and registers them under `tag`. The
    /// registration call is only made once every upload has succeeded.
    pub async fn upload(
        &self,
        batch: UploadBatch,
        tag: &str,
        youtube_links: &[String],
    ) -> Result<RemoteSessionId, UploadError> {
        if batch.files.is_empty() {
            return Err(UploadError::EmptyBatch);
        }

        let mut seen = HashSet::new();
        for file in &batch.files {
            if !seen.insert(file.filename.as_str()) {
                return Err(UploadError::DuplicateFilename(file.filename.clone()));
            }
        }

        let filenames: Vec<String> = batch.files.iter().map(|f| f.filename.clone()).collect();
        info!(
            "Requesting {} upload URLs for session {}",
            filenames.len(),
            batch.session_id
        );

        let urls = self
            .backend
            .presign_uploads(&batch.session_id, &filenames)
            .await
            .map_err(UploadError::Presign)?;

        let mut targets = Vec::with_capacity(batch.files.len());
        for file in &batch.files {
            let url = urls
                .get(&file.filename)
                .ok_or_else(|| UploadError::MissingUrl(file.filename.clone()))?;
            targets.push((file, url.as_str()));
        }

        let uploads = targets.into_iter().map(|(file, url)| {
            let backend = self.backend.clone();
            async move {
                let result = backend
                    .upload_object(url, file.content.clone(), &file.content_type)
                    .await;
                (file.filename.clone(), result)
            }
        });

        let mut failed = Vec::new();
        let mut succeeded = 0;
        for (filename, result) in join_all(uploads).await {
            match result {
                Ok(()) => succeeded += 1,
                Err(reason) => {
                    error!("Upload of {} failed: {}", filename, reason);
                    failed.push(FailedUpload { filename, reason });
                }
            }
        }

        if !failed.is_empty() {
            return Err(UploadError::Upload { failed, succeeded });
        }

        let request = StoreRequest {
            session_id: batch.session_id.to_string(),
            tag: tag.to_string(),
            yt_list: youtube_links.to_vec(),
        };
        self.backend
            .register_documents(&request)
            .await
            .map_err(UploadError::Register)?;

        info!(
            "Uploaded and registered {} documents for session {}",
            succeeded, batch.session_id
        );
        Ok(batch.session_id)
    }
}
