use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Method;
use bookshelf::config::{Cli, Config, default_config_dir, default_config_path};
use bookshelf::db::Database;
use bookshelf::handler::AppState;
use bookshelf::routes::routes;
use bookshelf::service::BookService;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // .env is optional; real environment variables take precedence
    let _ = dotenvy::dotenv();

    // Config given with --config keeps its data (the database) next to it,
    // otherwise both live under ~/.bookshelf/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = PathBuf::from(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("bookshelf.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));
    if let Err(e) = db.sync().await {
        tracing::warn!(error = %e, "initial replica sync failed, serving local data");
    }

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let cancellation_token = CancellationToken::new();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = routes().layer(cors).with_state(AppState {
        books: BookService::new(db),
    });

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl+c signal received, preparing to shutdown");
        }
        shutdown_token.cancel();
    });

    tracing::info!("bookshelf.svc running on {}", &address);
    let server = axum::serve(listener, app).with_graceful_shutdown(cancellation_token.cancelled_owned());
    if let Err(err) = server.await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }

    tracing::info!("bookshelf.svc going off, graceful shutdown complete");
}
