pub mod context;
pub mod firebase;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;

pub use context::{AuthContext, AuthState};
pub use firebase::FirebaseAuth;

/// Signed-in user as reported by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider_id: Option<String>,
    pub id_token: String,
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("provider_id", &self.provider_id)
            .field("id_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("{0}")]
    Provider(String),
    #[error("Invalid Response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Federated sign-in with an identity token minted by `provider_id`
    /// (for example `google.com`).
    async fn sign_in_with_idp(&self, provider_id: &str, id_token: &str) -> Result<AuthUser, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Auth state notifications. The receiver observes the current state
    /// first, then every change.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}
