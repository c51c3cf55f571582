use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{BackendError, DocumentBackend};
use crate::chat::query;
use crate::store::models::{Message, RemoteSessionId, ThreadId, ThreadPatch};
use crate::store::{SessionStore, StoreError};
use crate::upload::{UploadBatch, UploadError, UploadFile, UploadOrchestrator};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("Could not obtain a remote session: {0}")]
    Session(#[from] BackendError),
    #[error("Thread {0} disappeared while it was in use")]
    ThreadGone(ThreadId),
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub thread_id: ThreadId,
    pub reply: Message,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub thread_id: ThreadId,
    pub session_id: RemoteSessionId,
    pub filenames: Vec<String>,
}

/// Turns user actions into store updates and remote calls.
pub struct ChatController {
    store: Arc<SessionStore>,
    backend: Arc<dyn DocumentBackend>,
    tag: String,
}

impl ChatController {
    pub fn new(store: Arc<SessionStore>, backend: Arc<dyn DocumentBackend>, tag: impl Into<String>) -> Self {
        Self {
            store,
            backend,
            tag: tag.into(),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Appends `utterance` to the selected thread (creating one when nothing
    /// is selected), asks the backend and appends the answer. A failed
    /// question is recorded as an error message, not returned as an error.
    ///
    /// The answer is appended to the thread that asked, even if the
    /// selection moved while the request was in flight.
    pub async fn send_message(&self, utterance: &str) -> Result<SendOutcome, ChatError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let (thread_id, session_id) = self.ensure_thread().await?;
        self.store.append(thread_id, Message::user(utterance))?;

        let reply = match query::ask(self.backend.as_ref(), utterance, &self.tag, &session_id).await {
            Ok(answer) => Message::assistant(answer),
            Err(e) => {
                warn!("Question on thread {} failed: {}", thread_id, e);
                Message::error(e.user_message())
            }
        };

        self.store.append(thread_id, reply.clone())?;
        Ok(SendOutcome { thread_id, reply })
    }

    /// Uploads `files` into the selected thread's session and leaves a note
    /// in the transcript once they are queryable.
    pub async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        youtube_links: &[String],
    ) -> Result<UploadOutcome, ChatError> {
        if files.is_empty() {
            return Err(UploadError::EmptyBatch.into());
        }

        let (thread_id, session_id) = self.ensure_thread().await?;
        let filenames: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();

        let orchestrator = UploadOrchestrator::new(self.backend.clone());
        let batch = UploadBatch { session_id, files };
        let session_id = orchestrator.upload(batch, &self.tag, youtube_links).await?;

        let notice = format!(
            "Uploaded {} document(s): {}",
            filenames.len(),
            filenames.join(", ")
        );
        self.store.append(thread_id, Message::assistant(notice))?;

        Ok(UploadOutcome {
            thread_id,
            session_id,
            filenames,
        })
    }

    /// Selected thread and its remote session, creating or binding whichever
    /// is missing.
    async fn ensure_thread(&self) -> Result<(ThreadId, RemoteSessionId), ChatError> {
        let selected = self
            .store
            .snapshot()
            .selected_thread()
            .map(|t| (t.id, t.remote_session_id.clone()));

        let thread_id = match selected {
            Some((id, Some(session))) => return Ok((id, session)),
            Some((id, None)) => {
                let session = self.backend.create_session().await?;
                info!("Bound thread {} to session {}", id, session);
                self.store.update(id, ThreadPatch::remote_session_id(session))?;
                id
            }
            None => self.store.create_thread(self.backend.as_ref()).await?,
        };

        let snapshot = self.store.snapshot();
        let session = snapshot
            .thread(thread_id)
            .and_then(|t| t.remote_session_id.clone())
            .ok_or(ChatError::ThreadGone(thread_id))?;
        Ok((thread_id, session))
    }
}
