use serde::Deserialize;

pub const DEFAULT_TAG: &str = "test_frontend_user";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Gate the chat screen behind a signed-in user.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_identity_url")]
    pub base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: false,
            api_key: String::new(),
            base_url: default_identity_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("DOCCHAT").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${DOCCHAT_BACKEND_URL}
        app_config.backend.base_url = expand_env(&app_config.backend.base_url)
            .trim_end_matches('/')
            .to_string();
        app_config.storage.path = expand_env(&app_config.storage.path);
        app_config.auth.api_key = expand_env(&app_config.auth.api_key);

        if app_config.backend.base_url.is_empty() {
            return Err(config::ConfigError::Message(
                "backend.base_url must not be empty".to_string(),
            ));
        }

        Ok(app_config)
    }
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

fn default_storage_path() -> String {
    "docchat.duckdb".to_string()
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}

pub fn expand_env(val: &str) -> String {
    match val.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).unwrap_or_default(),
        None => val.to_string(),
    }
}
