//! CLI definitions for the `parley` binary.
//!
//! Uses clap derive macros. Every `serve` flag also reads an environment
//! variable, and anything left unset falls back to the config file and then
//! to built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use secrecy::SecretString;

use parley_infra::config::split_prompt_lines;
use parley_types::config::{BackendKind, GatewayConfig};

/// Chat gateway in front of interchangeable conversational backends.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway.
    Serve(ServeArgs),

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Flags of `parley serve`.
#[derive(Args, Default)]
pub struct ServeArgs {
    /// TOML config file; CLI flags and environment variables override it.
    #[arg(long, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend to drive: echo, ollama or characterai.
    #[arg(short, long, env = "BACKEND_TYPE")]
    pub backend: Option<BackendKind>,

    /// Port to listen on.
    #[arg(short, long, env = "SERVER_PORT")]
    pub port: Option<u16>,

    /// Address to bind.
    #[arg(long, env = "SERVER_HOST")]
    pub host: Option<String>,

    /// Timeout in seconds for each upstream request.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// character.ai access token (guest login when absent).
    #[arg(short = 't', long, env = "CHARACTER_AI_TOKEN", hide_env_values = true)]
    pub character_ai_token: Option<String>,

    /// character.ai character id.
    #[arg(short = 'c', long, env = "CHARACTER_AI_CHARACTER_ID")]
    pub character_id: Option<String>,

    /// Base URL of the Ollama server.
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Model the Ollama backend pulls and chats with.
    #[arg(long, env = "OLLAMA_BASE_MODEL")]
    pub ollama_base_model: Option<String>,

    /// User prompt that opens every Ollama conversation.
    #[arg(long, env = "OLLAMA_INITIAL_PROMPT")]
    pub ollama_initial_prompt: Option<String>,

    /// System prompt sent before the opener (repeatable; env is newline-separated).
    #[arg(long = "ollama-system-prompt", env = "OLLAMA_SYSTEM_PROMPTS", value_delimiter = '\n')]
    pub ollama_system_prompts: Vec<String>,

    /// System prompt appended after the greeting (repeatable; env is newline-separated).
    #[arg(long = "ollama-post-introduction-prompt", env = "OLLAMA_POST_INTRO_PROMPTS", value_delimiter = '\n')]
    pub ollama_post_introduction_prompts: Vec<String>,
}

impl ServeArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(token) = self.character_ai_token.filter(|t| !t.is_empty()) {
            config.character_ai.access_token = Some(SecretString::from(token));
        }
        if let Some(id) = self.character_id {
            config.character_ai.character_id = id;
        }
        if let Some(url) = self.ollama_url {
            config.ollama.base_url = url;
        }
        if let Some(model) = self.ollama_base_model {
            config.ollama.model = model;
        }
        if let Some(prompt) = self.ollama_initial_prompt {
            config.ollama.initial_prompt = prompt;
        }
        let system_prompts = normalize_prompts(self.ollama_system_prompts);
        if !system_prompts.is_empty() {
            config.ollama.pre_introduction_prompts = system_prompts;
        }
        let post_prompts = normalize_prompts(self.ollama_post_introduction_prompts);
        if !post_prompts.is_empty() {
            config.ollama.post_introduction_prompts = post_prompts;
        }
        config
    }
}

fn normalize_prompts(prompts: Vec<String>) -> Vec<String> {
    prompts.iter().flat_map(|p| split_prompt_lines(p)).collect()
}
