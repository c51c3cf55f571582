#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

use docchat::backend::models::{QueryRequest, QueryResponse, StoreRequest};
use docchat::backend::{BackendError, DocumentBackend};
use docchat::db;
use docchat::store::models::RemoteSessionId;
use docchat::store::SessionStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateSession,
    Query { query: String, tag: String, session_id: String },
    Presign { session_id: String, filenames: Vec<String> },
    Upload { url: String, content_type: String, bytes: usize },
    Register { session_id: String, tag: String, yt_list: Vec<String> },
}

#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    Empty,
    Remote { status: u16, detail: Option<String> },
    Network,
}

/// In-process stand-in for the document backend that records every call.
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    sessions: AtomicUsize,
    answer: Mutex<Answer>,
    failing_uploads: HashSet<String>,
    unsigned: HashSet<String>,
    upload_barrier: Option<Arc<Barrier>>,
    session_fails: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            sessions: AtomicUsize::new(0),
            answer: Mutex::new(Answer::Text("ok".to_string())),
            failing_uploads: HashSet::new(),
            unsigned: HashSet::new(),
            upload_barrier: None,
            session_fails: false,
        }
    }

    pub fn answering(text: &str) -> Self {
        let backend = Self::new();
        backend.set_answer(Answer::Text(text.to_string()));
        backend
    }

    pub fn failing_upload(mut self, filename: &str) -> Self {
        self.failing_uploads.insert(filename.to_string());
        self
    }

    pub fn without_url_for(mut self, filename: &str) -> Self {
        self.unsigned.insert(filename.to_string());
        self
    }

    /// Every upload waits until `parties` uploads are in flight together.
    pub fn with_upload_barrier(mut self, parties: usize) -> Self {
        self.upload_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn with_failing_sessions(mut self) -> Self {
        self.session_fails = true;
        self
    }

    pub fn set_answer(&self, answer: Answer) {
        *self.answer.lock().unwrap() = answer;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn presigned_url(session_id: &str, filename: &str) -> String {
    format!("https://storage.test/{}/{}", session_id, filename)
}

#[async_trait]
impl DocumentBackend for FakeBackend {
    async fn create_session(&self) -> Result<RemoteSessionId, BackendError> {
        self.record(Call::CreateSession);
        if self.session_fails {
            return Err(BackendError::Network("connection refused".to_string()));
        }
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteSessionId::new(format!("session-{}", n)))
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError> {
        self.record(Call::Query {
            query: request.query.clone(),
            tag: request.tag.clone(),
            session_id: request.session_id.clone(),
        });
        let answer = self.answer.lock().unwrap().clone();
        match answer {
            Answer::Text(text) => Ok(QueryResponse {
                generated_text: Some(text),
            }),
            Answer::Empty => Ok(QueryResponse {
                generated_text: None,
            }),
            Answer::Remote { status, detail } => Err(BackendError::Remote { status, detail }),
            Answer::Network => Err(BackendError::Network("connection reset".to_string())),
        }
    }

    async fn presign_uploads(
        &self,
        session_id: &RemoteSessionId,
        filenames: &[String],
    ) -> Result<HashMap<String, String>, BackendError> {
        self.record(Call::Presign {
            session_id: session_id.to_string(),
            filenames: filenames.to_vec(),
        });
        Ok(filenames
            .iter()
            .filter(|name| !self.unsigned.contains(*name))
            .map(|name| (name.clone(), presigned_url(session_id.as_str(), name)))
            .collect())
    }

    async fn upload_object(
        &self,
        url: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError> {
        if let Some(barrier) = &self.upload_barrier {
            barrier.wait().await;
        }
        self.record(Call::Upload {
            url: url.to_string(),
            content_type: content_type.to_string(),
            bytes: content.len(),
        });
        let failing = self
            .failing_uploads
            .iter()
            .any(|name| url.ends_with(&format!("/{}", name)));
        if failing {
            return Err(BackendError::Remote {
                status: 403,
                detail: Some("Request has expired".to_string()),
            });
        }
        Ok(())
    }

    async fn register_documents(&self, request: &StoreRequest) -> Result<(), BackendError> {
        self.record(Call::Register {
            session_id: request.session_id.clone(),
            tag: request.tag.clone(),
            yt_list: request.yt_list.clone(),
        });
        Ok(())
    }
}

pub fn memory_store() -> (db::DbPool, Arc<SessionStore>) {
    let pool = db::in_memory().unwrap();
    let store = Arc::new(SessionStore::load(pool.clone()).unwrap());
    (pool, store)
}
