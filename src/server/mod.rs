pub mod api;

use crate::relay::Relay;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use log::{ info, error };

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

pub struct Server {
    addr: String,
    relay: Arc<Relay>,
    tls: Option<TlsPaths>,
}

impl Server {
    pub fn new(addr: String, relay: Arc<Relay>, tls: Option<TlsPaths>) -> Self {
        Self { addr, relay, tls }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::router(self.relay.clone());

        match &self.tls {
            Some(paths) => {
                info!(
                    "TLS enabled. Loading certificate from '{}' and key from '{}'",
                    paths.cert_path,
                    paths.key_path
                );
                let _ = rustls::crypto::ring::default_provider().install_default();
                let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                    &paths.cert_path,
                    &paths.key_path
                ).await?;

                info!("HTTPS relay listening on: https://{}{}", addr, api::CHAT_ROUTE);
                axum_server::bind_rustls(addr, tls_config)
                    .serve(app.into_make_service())
                    .await
                    .map_err(|e| {
                        error!("HTTPS server error: {}", e);
                        e
                    })?;
            }
            None => {
                let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                    error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                    e
                })?;
                info!("HTTP relay listening on: http://{}{}", addr, api::CHAT_ROUTE);
                axum::serve(listener, app.into_make_service()).await.map_err(|e| {
                    error!("HTTP server error: {}", e);
                    e
                })?;
            }
        }

        Ok(())
    }
}
