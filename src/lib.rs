pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod widget;

use cli::{ Cli, Command, ServeArgs };
use config::prompt::resolve_prompts;
use llm::chat::{ new_client, UpstreamError };
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Chat(args) => cli::chat::run_chat(&args).await,
    }
}

pub async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let llm_config = args.llm_config()?;
    let settings = args.relay_settings();
    let tls = args.tls_paths()?;

    info!("--- Relay Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", llm_config.llm_type);
    info!("Chat Model: {}", llm_config.completion_model.as_deref().unwrap_or(llm_config.llm_type.default_model()));
    info!("Chat Base URL: {}", llm_config.base_url.as_deref().unwrap_or(llm_config.llm_type.default_base_url()));
    info!("Credential Configured: {}", llm_config.api_key.is_some());
    info!("Upstream Timeout: {:?}", settings.upstream_timeout);
    info!("History Window: {}", settings.history_window);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("TLS Enabled: {}", tls.is_some());
    info!("---------------------------");

    let prompts = resolve_prompts(args.prompts_path.as_deref())?;
    let client = match new_client(&llm_config) {
        Ok(client) => Some(client),
        Err(UpstreamError::MissingApiKey) => None,
        Err(e) => return Err(e.into()),
    };

    let relay = Arc::new(Relay::new(settings, prompts, client));
    let server = Server::new(args.server_addr.clone(), relay, tls);
    server.run().await
}
