//! Gateway configuration types.
//!
//! `GatewayConfig` is the merged view of built-in defaults, the optional
//! TOML file and CLI/environment overrides. Every field has a default so a
//! partial file deserializes cleanly.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Which backend the gateway drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Echo,
    Ollama,
    #[serde(rename = "characterai")]
    CharacterAi,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Echo => write!(f, "echo"),
            BackendKind::Ollama => write!(f, "ollama"),
            BackendKind::CharacterAi => write!(f, "characterai"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(BackendKind::Echo),
            "ollama" => Ok(BackendKind::Ollama),
            "characterai" | "character_ai" | "character-ai" => Ok(BackendKind::CharacterAi),
            other => Err(format!("unknown backend type: '{other}'")),
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub server: ServerConfig,

    /// Timeout applied to every upstream HTTP request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default, rename = "characterai")]
    pub character_ai: CharacterAiConfig,
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            server: ServerConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
            ollama: OllamaConfig::default(),
            character_ai: CharacterAiConfig::default(),
        }
    }
}

/// Listen address of the HTTP gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings for the self-hosted model server backend.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// System prompts placed before the opener, in order.
    #[serde(default)]
    pub pre_introduction_prompts: Vec<String>,

    /// User prompt that opens every conversation.
    #[serde(default = "default_initial_prompt")]
    pub initial_prompt: String,

    /// System prompts appended after the greeting, in order.
    #[serde(default)]
    pub post_introduction_prompts: Vec<String>,
}

fn default_ollama_url() -> String {
    "http://ollama:11434".to_string()
}

fn default_ollama_model() -> String {
    "neural-chat".to_string()
}

fn default_initial_prompt() -> String {
    "please introduce yourself".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            pre_introduction_prompts: Vec::new(),
            initial_prompt: default_initial_prompt(),
            post_introduction_prompts: Vec::new(),
        }
    }
}

/// Settings for the character.ai backend.
///
/// The access token is wrapped in [`SecretString`] and never appears in
/// `Debug` output.
#[derive(Debug, Deserialize)]
pub struct CharacterAiConfig {
    /// Absent means "log in as guest".
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub access_token: Option<SecretString>,

    #[serde(default = "default_character_id")]
    pub character_id: String,

    #[serde(default = "default_character_ai_url")]
    pub base_url: String,

    /// Overrides the User-Agent sent upstream.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_character_id() -> String {
    "1AYQkwEQ83I3JKxMeNvctG4m7kQL1zTPJuGugAVsT_k".to_string()
}

fn default_character_ai_url() -> String {
    "https://beta.character.ai/".to_string()
}

impl Default for CharacterAiConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            character_id: default_character_id(),
            base_url: default_character_ai_url(),
            user_agent: None,
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.backend, BackendKind::Echo);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ollama.base_url, "http://ollama:11434");
        assert_eq!(config.ollama.model, "neural-chat");
        assert_eq!(config.ollama.initial_prompt, "please introduce yourself");
        assert!(config.ollama.pre_introduction_prompts.is_empty());
        assert!(config.character_ai.access_token.is_none());
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("echo".parse::<BackendKind>().unwrap(), BackendKind::Echo);
        assert_eq!("OLLAMA".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert_eq!(
            "characterai".parse::<BackendKind>().unwrap(),
            BackendKind::CharacterAi
        );
        assert!("gpt".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let toml_src = r#"
backend = "ollama"

[ollama]
model = "llama3"
pre_introduction_prompts = ["you always refer to yourself as Makani."]

[characterai]
access_token = "tok"
"#;
        let config: GatewayConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.ollama.base_url, "http://ollama:11434");
        assert_eq!(config.ollama.pre_introduction_prompts.len(), 1);
        assert_eq!(
            config.character_ai.access_token.as_ref().unwrap().expose_secret(),
            "tok"
        );
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn test_empty_token_means_guest() {
        let config: GatewayConfig = toml::from_str("[characterai]\naccess_token = \"\"\n").unwrap();
        assert!(config.character_ai.access_token.is_none());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let config: GatewayConfig =
            toml::from_str("[characterai]\naccess_token = \"super-secret\"\n").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
