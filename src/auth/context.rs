use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::auth::{AuthUser, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No notification from the provider yet.
    Pending,
    Resolved(Option<AuthUser>),
}

impl AuthState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthState::Resolved(user) => user.as_ref(),
            AuthState::Pending => None,
        }
    }
}

/// Process-wide mirror of the provider's signed-in user. Holds one
/// subscription for its whole lifetime; dropping it unsubscribes.
pub struct AuthContext {
    state: watch::Receiver<AuthState>,
    task: JoinHandle<()>,
}

impl AuthContext {
    /// Must be called from within a tokio runtime.
    pub fn start(provider: &dyn IdentityProvider) -> Self {
        let mut updates = provider.subscribe();
        let (tx, rx) = watch::channel(AuthState::Pending);
        let provider_name = provider.name().to_string();

        let task = tokio::spawn(async move {
            loop {
                let user = updates.borrow_and_update().clone();
                match &user {
                    Some(u) => info!("[{}] signed in as {}", provider_name, u.uid),
                    None => info!("[{}] no user signed in", provider_name),
                }
                tx.send_replace(AuthState::Resolved(user));

                if updates.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { state: rx, task }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Pending)
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state.borrow().user().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Waits for the first notification and returns the user it carried, or
    /// the latest one if that has already happened.
    pub async fn wait_resolved(&self) -> Option<AuthUser> {
        let mut rx = self.state.clone();
        loop {
            if let AuthState::Resolved(user) = &*rx.borrow_and_update() {
                return user.clone();
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.task.abort();
    }
}
