//! Runtime configuration for llm-gateway.
//!
//! Everything is read from the environment once at process start and held
//! immutable for the process lifetime. A missing upstream credential is not
//! an error here: it surfaces at first use, per endpoint.

use clap::Parser;

/// Hardcoded fallback identifiers, overridable by environment.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDINGS_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PORT: u16 = 8000;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "llm-gateway", about = "HTTP gateway in front of an OpenAI-compatible API")]
pub struct Cli {
    /// Listening port (overrides the PORT environment variable).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API credential. `None` means every model call fails with a
    /// "not configured" error at the moment it is needed.
    pub api_key: Option<String>,

    /// Base URL of the upstream OpenAI-compatible API.
    pub base_url: String,

    /// Default chat model when the request carries no override.
    pub chat_model: String,

    /// Default embeddings model when the request carries no override.
    pub embeddings_model: String,

    /// CORS allow-list. Empty means all origins are allowed.
    pub cors_origins: Vec<String>,

    /// HTTP listening port.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embeddings_model: DEFAULT_EMBEDDINGS_MODEL.to_string(),
            cors_origins: Vec::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let chat_model = std::env::var("OPENAI_CHAT_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let embeddings_model = std::env::var("OPENAI_EMBEDDINGS_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDINGS_MODEL.to_string());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "PORT is not a valid port number, using default");
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        Self {
            api_key,
            base_url,
            chat_model,
            embeddings_model,
            cors_origins,
            port,
        }
    }
}

/// Parse a comma-separated origin allow-list. Blank entries are dropped;
/// an empty result or a `*` entry means "allow all origins".
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.chat_model, "gpt-4o-mini");
        assert_eq!(cfg.embeddings_model, "text-embedding-3-small");
        assert_eq!(cfg.port, 8000);
        assert!(cfg.cors_origins.is_empty());
    }

    #[test]
    fn test_parse_origins_list() {
        let origins = parse_origins("http://localhost:5173, https://app.example.com ,,");
        assert_eq!(
            origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }

    #[test]
    fn test_parse_origins_wildcard() {
        assert!(parse_origins("*").is_empty());
        assert!(parse_origins("").is_empty());
        // A wildcard anywhere in the list wins.
        assert!(parse_origins("http://localhost, *").is_empty());
    }
}
