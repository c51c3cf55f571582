pub mod models;
pub mod persist;
pub mod reducer;

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{error, info};

use crate::backend::{BackendError, DocumentBackend};
use crate::db::DbPool;
use models::{Message, Thread, ThreadId, ThreadPatch};

pub use reducer::{StoreAction, StoreSnapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage Error: {0}")]
    Database(#[from] duckdb::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Could not obtain a remote session: {0}")]
    Session(#[from] BackendError),
}

/// Chat state container. Every action swaps in a new snapshot and, unless it
/// only moves the selection, writes the full thread list to storage before
/// the lock is released.
pub struct SessionStore {
    pool: DbPool,
    state: Mutex<Arc<StoreSnapshot>>,
}

impl SessionStore {
    pub fn load(pool: DbPool) -> Result<Self, StoreError> {
        let threads = {
            let conn = lock(&*pool);
            persist::load_threads(&conn)?
        };
        info!("Loaded {} chat threads", threads.len());

        Ok(Self {
            pool,
            state: Mutex::new(Arc::new(StoreSnapshot::from_threads(threads))),
        })
    }

    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        lock(&self.state).clone()
    }

    /// Applies `action` to the latest snapshot. Unknown thread ids are a
    /// silent no-op. On a storage failure the in-memory update is kept and the
    /// error is returned.
    pub fn dispatch(&self, action: StoreAction) -> Result<Arc<StoreSnapshot>, StoreError> {
        let mut state = lock(&self.state);
        let Some(next) = state.reduce(&action) else {
            return Ok(state.clone());
        };

        let next = Arc::new(next);
        *state = next.clone();

        if action.persists() {
            let conn = lock(&*self.pool);
            let written = match action {
                StoreAction::ClearAll => persist::clear_threads(&conn),
                _ => persist::save_threads(&conn, &next.threads),
            };
            if let Err(e) = written {
                error!("Failed to persist chat threads: {}", e);
                return Err(e);
            }
        }

        Ok(next)
    }

    /// Starts a conversation. An existing thread without messages is reused
    /// instead of stacking another empty one; otherwise a new thread bound to
    /// a fresh remote session becomes the selected one.
    pub async fn create_thread(&self, backend: &dyn DocumentBackend) -> Result<ThreadId, StoreError> {
        let reusable = self
            .snapshot()
            .empty_thread()
            .map(|t| (t.id, t.remote_session_id.is_some()));

        if let Some((id, has_session)) = reusable {
            if !has_session {
                let session = backend.create_session().await?;
                self.dispatch(StoreAction::Update {
                    id,
                    patch: ThreadPatch::remote_session_id(session),
                })?;
            }
            self.dispatch(StoreAction::Select(id))?;
            return Ok(id);
        }

        let session = backend.create_session().await?;
        let thread = Thread::new(Some(session));
        let id = thread.id;
        self.dispatch(StoreAction::CreateThread(thread))?;
        info!("Created thread {}", id);
        Ok(id)
    }

    pub fn select(&self, id: ThreadId) -> Result<Arc<StoreSnapshot>, StoreError> {
        self.dispatch(StoreAction::Select(id))
    }

    pub fn append(&self, id: ThreadId, message: Message) -> Result<Arc<StoreSnapshot>, StoreError> {
        self.dispatch(StoreAction::Append { id, message })
    }

    pub fn update(&self, id: ThreadId, patch: ThreadPatch) -> Result<Arc<StoreSnapshot>, StoreError> {
        self.dispatch(StoreAction::Update { id, patch })
    }

    pub fn remove(&self, id: ThreadId) -> Result<Arc<StoreSnapshot>, StoreError> {
        self.dispatch(StoreAction::Remove(id))
    }

    pub fn clear_all(&self) -> Result<Arc<StoreSnapshot>, StoreError> {
        self.dispatch(StoreAction::ClearAll)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
