use tracing::warn;

use crate::store::models::{Message, Origin, Thread, ThreadId, ThreadPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    CreateThread(Thread),
    Select(ThreadId),
    Append { id: ThreadId, message: Message },
    Update { id: ThreadId, patch: ThreadPatch },
    Remove(ThreadId),
    ClearAll,
}

impl StoreAction {
    /// Whether applying the action changes what ends up in storage.
    pub fn persists(&self) -> bool {
        !matches!(self, StoreAction::Select(_))
    }
}

/// Immutable view of every thread plus the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub threads: Vec<Thread>,
    pub selected: Option<ThreadId>,
}

impl StoreSnapshot {
    pub fn from_threads(threads: Vec<Thread>) -> Self {
        let selected = threads.first().map(|t| t.id);
        Self { threads, selected }
    }

    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn selected_thread(&self) -> Option<&Thread> {
        self.selected.and_then(|id| self.thread(id))
    }

    /// First thread nobody has written to yet.
    pub fn empty_thread(&self) -> Option<&Thread> {
        self.threads.iter().find(|t| t.is_empty())
    }

    /// Applies `action`. Returns `None` when the action targets an unknown
    /// thread and nothing changes.
    pub fn reduce(&self, action: &StoreAction) -> Option<StoreSnapshot> {
        match action {
            StoreAction::CreateThread(thread) => {
                let mut threads = self.threads.clone();
                threads.push(thread.clone());
                Some(StoreSnapshot {
                    threads,
                    selected: Some(thread.id),
                })
            }
            StoreAction::Select(id) => Some(StoreSnapshot {
                threads: self.threads.clone(),
                selected: self.thread(*id).map(|t| t.id),
            }),
            StoreAction::Append { id, message } => self.with_thread(*id, |thread| {
                if message.origin == Origin::User && thread.has_default_label() {
                    thread.label = message.text.clone();
                }
                thread.messages.push(message.clone());
            }),
            StoreAction::Update { id, patch } => self.with_thread(*id, |thread| {
                if let Some(label) = &patch.label {
                    thread.label = label.clone();
                }
                if let Some(session) = &patch.remote_session_id {
                    match &thread.remote_session_id {
                        None => thread.remote_session_id = Some(session.clone()),
                        Some(existing) if existing != session => {
                            warn!(
                                "Ignoring session {} for thread {}, already bound to {}",
                                session, thread.id, existing
                            );
                        }
                        Some(_) => {}
                    }
                }
            }),
            StoreAction::Remove(id) => {
                self.thread(*id)?;
                Some(StoreSnapshot {
                    threads: self.threads.iter().filter(|t| t.id != *id).cloned().collect(),
                    selected: self.selected.filter(|selected| selected != id),
                })
            }
            StoreAction::ClearAll => Some(StoreSnapshot::default()),
        }
    }

    fn with_thread(&self, id: ThreadId, edit: impl FnOnce(&mut Thread)) -> Option<StoreSnapshot> {
        let index = self.threads.iter().position(|t| t.id == id)?;
        let mut threads = self.threads.clone();
        edit(&mut threads[index]);
        Some(StoreSnapshot {
            threads,
            selected: self.selected,
        })
    }
}
