pub mod chat;

use clap::{ Args, Parser, Subcommand };
use std::time::Duration;

use crate::llm::{ LlmConfig, LlmType, ParseLlmTypeError };
use crate::relay::RelaySettings;
use crate::server::TlsPaths;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the chat relay HTTP server.
    Serve(ServeArgs),
    /// Chat from the terminal through a relay, or offline when no relay is given.
    Chat(ChatArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the relay to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    // --- Upstream LLM Args ---
    /// Upstream chat-completion provider (groq, openai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "groq")]
    pub chat_llm_type: String,

    /// API key for the upstream provider. Requests fail with a configuration error when unset.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub chat_api_key: Option<String>,

    /// Base URL of the provider's OpenAI-compatible API (e.g., https://api.groq.com/openai/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, provider default applies
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., llama-3.1-8b-instant, gpt-4o-mini)
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Sampling temperature sent upstream.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// max_tokens sent upstream.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "1024")]
    pub max_tokens: u32,

    // --- Relay Args ---
    /// Seconds to wait for the upstream before aborting the call.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "25")]
    pub upstream_timeout_secs: u64,

    /// Number of trailing client messages forwarded upstream.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "5")]
    pub history_window: usize,

    /// Optional JSON file with a `system_prompt` field overriding the built-in prompt.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- TLS Args ---
    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,
}

impl ServeArgs {
    pub fn llm_config(&self) -> Result<LlmConfig, ParseLlmTypeError> {
        let llm_type: LlmType = self.chat_llm_type.parse()?;
        Ok(LlmConfig {
            llm_type,
            api_key: self.chat_api_key.clone().filter(|k| !k.trim().is_empty()),
            completion_model: self.chat_model.clone(),
            base_url: self.chat_base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            history_window: self.history_window,
            upstream_timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }

    pub fn tls_paths(&self) -> Result<Option<TlsPaths>, String> {
        if !self.enable_tls {
            return Ok(None);
        }
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert_path), Some(key_path)) =>
                Ok(
                    Some(TlsPaths {
                        cert_path: cert_path.clone(),
                        key_path: key_path.clone(),
                    })
                ),
            (Some(_), None) | (None, Some(_)) =>
                Err("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.".into()),
            (None, None) => Err("--enable-tls was set but no certificate/key paths provided.".into()),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Relay endpoint (e.g., http://127.0.0.1:3000/api/chat). Offline canned replies when unset.
    #[arg(long, env = "RELAY_URL")]
    pub relay_url: Option<String>,
}
