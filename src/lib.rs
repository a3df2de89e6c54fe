pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::source::{LocalFileSource, UploadedFileSource};
pub use crate::config::AppConfig;
pub use crate::core::pipeline::{PipelineRunner, ProcessingSettings};
pub use crate::core::processor::CsvProcessor;
pub use crate::utils::error::{ProcessError, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// 建立 router 並在指定位址提供服務，直到收到 Ctrl-C
pub async fn serve(config: &AppConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let processor = CsvProcessor::new(config.processing_settings()?);
    let state = Arc::new(api::AppState::new(processor, config.upload_dir())?);
    let router = api::routes(Arc::clone(&state), config.max_upload_bytes());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 CSV Processor API running at http://{}", listener.local_addr()?);
    tracing::info!("📂 Uploads are staged in {}", state.upload_dir.display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
