use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub assistants: AssistantsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: u64,
    /// Mark the auth cookie `Secure` (enable behind TLS)
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Primary key, used for chat, images and the execution assistant
    #[serde(default)]
    pub api_key: Option<String>,
    /// Optional key for the reflection assistant; falls back to the primary
    #[serde(default)]
    pub secondary_api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// When set, chat completions go to the Azure deployment instead
    #[serde(default)]
    pub azure: Option<AzureConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    #[serde(default = "default_azure_api_version")]
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantsConfig {
    #[serde(default = "default_execution_assistant")]
    pub execution_assistant_id: String,
    #[serde(default = "default_reflection_assistant")]
    pub reflection_assistant_id: String,
    #[serde(default = "PollPolicy::reasoning")]
    pub reasoning_poll: PollPolicy,
    #[serde(default = "PollPolicy::dual")]
    pub dual_poll: PollPolicy,
    /// Upper bound for one reasoning-pipeline request
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
}

/// Fixed-interval polling bounded by an attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn reasoning() -> Self {
        Self {
            interval_ms: 2000,
            max_attempts: 30,
        }
    }

    pub fn dual() -> Self {
        Self {
            interval_ms: 3000,
            max_attempts: 20,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_max_connections() -> u32 { 5 }
fn default_token_expiry_hours() -> u64 { 168 }
fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_chat_model() -> String { "gpt-4o-mini".to_string() }
fn default_image_model() -> String { "dall-e-3".to_string() }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_image_timeout_secs() -> u64 { 60 }
fn default_max_tokens() -> u32 { 1000 }
fn default_temperature() -> f32 { 0.7 }
fn default_azure_api_version() -> String { "2024-02-15-preview".to_string() }
fn default_execution_assistant() -> String { "asst_hUC1KmMkIOKOx9OhE2P5GRBa".to_string() }
fn default_reflection_assistant() -> String { "asst_10A35sa3kEsM7jS1EvdYAmBm".to_string() }
fn default_max_duration_secs() -> u64 { 60 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./data/balance.db".to_string(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            token_expiry_hours: default_token_expiry_hours(),
            cookie_secure: false,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secondary_api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            request_timeout_secs: default_request_timeout_secs(),
            image_timeout_secs: default_image_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            azure: None,
        }
    }
}

impl Default for AssistantsConfig {
    fn default() -> Self {
        Self {
            execution_assistant_id: default_execution_assistant(),
            reflection_assistant_id: default_reflection_assistant(),
            reasoning_poll: PollPolicy::reasoning(),
            dual_poll: PollPolicy::dual(),
            max_duration_secs: default_max_duration_secs(),
        }
    }
}

impl OpenAiConfig {
    pub fn primary_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn secondary_key(&self) -> Option<&str> {
        self.secondary_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        // Try to load from environment variable
        if let Ok(path) = std::env::var("BALANCE_CONFIG") {
            return Self::load_from_path(&PathBuf::from(path));
        }

        // Try to load from default locations
        let default_paths = vec![
            PathBuf::from("balance-server.toml"),
            PathBuf::from("config/balance-server.toml"),
            PathBuf::from("/etc/balance/server.toml"),
        ];

        for path in default_paths {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        tracing::warn!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Layer environment variables over the file configuration.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY_SECONDARY") {
            self.openai.secondary_api_key = Some(key);
        }
        if let Some(id) = get("EXECUTION_ASSISTANT_ID") {
            self.assistants.execution_assistant_id = id;
        }
        if let Some(id) = get("REFLECTION_ASSISTANT_ID") {
            self.assistants.reflection_assistant_id = id;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(path) = get("DATABASE_PATH") {
            self.database.path = path;
        }

        if let (Some(endpoint), Some(api_key), Some(deployment)) = (
            get("AZURE_OPENAI_ENDPOINT"),
            get("AZURE_OPENAI_API_KEY"),
            get("AZURE_OPENAI_DEPLOYMENT"),
        ) {
            self.openai.azure = Some(AzureConfig {
                endpoint,
                api_key,
                deployment,
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(default_azure_api_version),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_expiry_hours, 168);
        assert_eq!(config.openai.chat_model, "gpt-4o-mini");
        assert_eq!(config.openai.max_tokens, 1000);
        assert_eq!(config.assistants.reasoning_poll, PollPolicy::reasoning());
        assert_eq!(config.assistants.dual_poll.max_attempts, 20);
        assert_eq!(config.assistants.max_duration_secs, 60);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [openai]
            api_key = "sk-test"
            temperature = 0.2

            [assistants.reasoning_poll]
            interval_ms = 10
            max_attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.openai.primary_key(), Some("sk-test"));
        assert_eq!(config.openai.image_model, "dall-e-3");
        assert_eq!(config.assistants.reasoning_poll.interval(), Duration::from_millis(10));
        assert_eq!(config.assistants.dual_poll, PollPolicy::dual());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let mut config = Config::default();
        config.openai.api_key = Some("   ".to_string());
        assert!(config.openai.primary_key().is_none());
        assert!(config.openai.secondary_key().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-primary"),
            ("OPENAI_API_KEY_SECONDARY", "sk-secondary"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_PATH", "/tmp/balance.db"),
            ("EXECUTION_ASSISTANT_ID", ""),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.openai.primary_key(), Some("sk-primary"));
        assert_eq!(config.openai.secondary_key(), Some("sk-secondary"));
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.database.path, "/tmp/balance.db");
        // Empty values leave the default in place
        assert_eq!(config.assistants.execution_assistant_id, default_execution_assistant());
        assert!(config.openai.azure.is_none());
    }

    #[test]
    fn test_azure_requires_endpoint_key_and_deployment() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "azure-key"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o-mini"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        let azure = config.openai.azure.unwrap();
        assert_eq!(azure.deployment, "gpt-4o-mini");
        assert_eq!(azure.api_version, "2024-02-15-preview");
    }
}
