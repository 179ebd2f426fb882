//! `vidtubed` — the VidTube server binary.
//!
//! Usage:
//!   vidtubed -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/vidtube/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod config;
mod login;
mod routes;

use std::sync::Arc;

use clap::Parser;
use jsonwebtoken::{DecodingKey, Validation};
use tracing::info;

use vidtube_core::Module;
use vidtube_media::service::{schema, MediaService};
use vidtube_media::MediaModule;

use auth_middleware::JwtState;
use config::ServerConfig;
use routes::AppState;

/// VidTube server.
#[derive(Parser, Debug)]
#[command(name = "vidtubed", about = "VidTube media server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    let core_config = server_config.service_config(cli.listen.as_deref());
    std::fs::create_dir_all(&core_config.data_dir)?;

    // Embedded stores.
    let store: Arc<vidtube_store::SqliteStore> = Arc::new(
        vidtube_store::SqliteStore::open(&core_config.resolve_db_path(), schema::COLLECTIONS)
            .map_err(|e| anyhow::anyhow!("failed to open entity store: {}", e))?,
    );
    let blob: Arc<dyn vidtube_blob::BlobStore> = Arc::new(
        vidtube_blob::FileStore::open(&core_config.resolve_media_dir())
            .map_err(|e| anyhow::anyhow!("failed to open media store: {}", e))?,
    );

    let service = Arc::new(MediaService::new(
        store,
        Arc::clone(&blob),
        core_config.view_timeout,
    ));

    let media_module = MediaModule::with_service(Arc::clone(&service));
    info!("Media module initialized");

    let module_routes = vec![(media_module.name().to_string(), media_module.routes())];

    let jwt_state = Arc::new(JwtState {
        decoding_key: DecodingKey::from_secret(server_config.jwt.secret.as_bytes()),
        validation: Validation::default(),
    });

    let app_state = AppState {
        jwt_state,
        server_config: Arc::new(server_config),
        service,
        blob,
    };

    let app = routes::build_router(app_state, module_routes);

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("VidTube server listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
