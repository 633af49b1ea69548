use anyhow::{Context, Result};

const DEFAULT_DEPLOYMENT: &str = "gpt-4.1";
const DEFAULT_API_VERSION: &str = "2024-10-21";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if the Azure OpenAI endpoint or key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub azure_endpoint: String,
    pub azure_api_key: String,
    pub azure_deployment: String,
    pub azure_api_version: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            azure_endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
            azure_api_key: require_env("AZURE_OPENAI_API_KEY")?,
            azure_deployment: std::env::var("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|_| DEFAULT_DEPLOYMENT.to_string()),
            azure_api_version: std::env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for handler tests; never touches the environment.
    pub fn for_tests() -> Self {
        Config {
            azure_endpoint: "https://example.openai.azure.com".to_string(),
            azure_api_key: "test-key".to_string(),
            azure_deployment: DEFAULT_DEPLOYMENT.to_string(),
            azure_api_version: DEFAULT_API_VERSION.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}
