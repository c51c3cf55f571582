use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::auth::{AuthError, AuthUser, IdentityProvider};
use crate::config::AuthConfig;

/// Email/password and federated sign-in against the Firebase Identity
/// Toolkit REST API. The signed-in user only lives in memory.
pub struct FirebaseAuth {
    client: Client,
    api_key: String,
    base_url: String,
    current: watch::Sender<Option<AuthUser>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    provider_id: Option<String>,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl FirebaseAuth {
    pub fn new(api_key: String, base_url: String) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            current,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.api_key.clone(), config.base_url.clone())
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .post(format!("{}/accounts:{}", self.base_url, method))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Identity provider error {}", status));
            warn!("accounts:{} rejected: {}", method, message);
            return Err(AuthError::Provider(message));
        }

        let parsed: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))?;

        let user = AuthUser {
            uid: parsed.local_id,
            email: parsed.email,
            display_name: parsed.display_name,
            provider_id: parsed.provider_id,
            id_token: parsed.id_token,
        };

        info!("accounts:{} succeeded for {}", method, user.uid);
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    fn name(&self) -> &str {
        "firebase"
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.call(
            "signInWithPassword",
            json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn sign_in_with_idp(&self, provider_id: &str, id_token: &str) -> Result<AuthUser, AuthError> {
        // JWTs and provider ids are URL-safe, so the post body needs no escaping.
        self.call(
            "signInWithIdp",
            json!({
                "postBody": format!("id_token={}&providerId={}", id_token, provider_id),
                "requestUri": "http://localhost",
                "returnIdpCredential": true,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.call(
            "signUp",
            json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.current.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}
