//! Engram HTTP server
//!
//! A thin axum front door over `engram-core`'s `Orchestrator`. Accepts one
//! turn per request, runs it end to end (extraction, STM gate, retrieval,
//! chat completion, background dispatch), and hands back the reply as JSON.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use engram_core::{EngramConfig, EchoChatModel, HashingEmbedder, LocalObjectStore, NullExtractor, Orchestrator, Storage, EMBEDDING_DIMENSIONS};

/// Parsed CLI arguments. `--data-dir` overrides `ENGRAM_DB_PATH`'s directory;
/// `--host`/`--port` override the config's bind address. Exits the process
/// for `--help`/`--version`.
struct Args {
    data_dir: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args { data_dir: None, host: None, port: None };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("engram-server v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("HTTP front door for the engram memory engine.");
                println!();
                println!("USAGE:");
                println!("    engram-server [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help              Print help information");
                println!("    -V, --version           Print version information");
                println!("    --data-dir <PATH>       Custom data directory (SQLite file + artifact store)");
                println!("    --host <HOST>           Bind host (default 127.0.0.1, or $ENGRAM_HOST)");
                println!("    --port <PORT>           Bind port (default 8080, or $ENGRAM_PORT)");
                println!();
                println!("ENVIRONMENT:");
                println!("    RUST_LOG                Log level filter (e.g., debug, info, warn, error)");
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("engram-server {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--data-dir" => {
                i += 1;
                parsed.data_dir = Some(PathBuf::from(require_value(&args, i, "--data-dir")));
            }
            "--host" => {
                i += 1;
                parsed.host = Some(require_value(&args, i, "--host"));
            }
            "--port" => {
                i += 1;
                let value = require_value(&args, i, "--port");
                parsed.port = Some(value.parse().unwrap_or_else(|_| {
                    eprintln!("error: --port requires a numeric argument, got '{value}'");
                    std::process::exit(1);
                }));
            }
            arg => {
                eprintln!("error: unknown argument '{arg}'");
                eprintln!("Try 'engram-server --help' for more information.");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn require_value(args: &[String], index: usize, flag: &str) -> String {
    match args.get(index) {
        Some(value) => value.clone(),
        None => {
            eprintln!("error: {flag} requires an argument");
            std::process::exit(1);
        }
    }
}

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

/// `POST /model` request body.
#[derive(Debug, Deserialize)]
struct ModelRequest {
    user_id: String,
    #[serde(default)]
    session_id: Option<String>,
    user_prompt: String,
    #[serde(default)]
    system_prompt: String,
}

#[derive(Debug, Serialize)]
struct ModelResponse {
    response: String,
    route: String,
    route_confidence: f64,
    stm_written: bool,
    artifact_queued: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    traceback: String,
}

async fn handle_model(State(state): State<AppState>, Json(body): Json<ModelRequest>) -> impl IntoResponse {
    let session_id = body.session_id.unwrap_or_else(|| body.user_id.clone());
    match state
        .orchestrator
        .process_turn(&body.user_id, &session_id, &body.user_prompt, &body.system_prompt)
        .await
    {
        Ok(reply) => Json(ModelResponse {
            response: reply.response,
            route: format!("{:?}", reply.route),
            route_confidence: reply.route_confidence,
            stm_written: reply.stm_written,
            artifact_queued: reply.artifact_queued,
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "turn processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: err.to_string(), traceback: format!("{err:?}") }),
            )
                .into_response()
        }
    }
}

async fn handle_liveness() -> impl IntoResponse {
    format!("engram-server v{} is alive", env!("CARGO_PKG_VERSION"))
}

#[tokio::main]
async fn main() {
    let args = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    info!("engram-server v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = EngramConfig::from_env();
    if let Some(data_dir) = args.data_dir {
        config.db_path = data_dir.join("engram.db");
        config.object_store_root = data_dir.join("artifacts");
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let storage = match Storage::open(Some(config.db_path.clone())) {
        Ok(s) => {
            info!(db_path = %config.db_path.display(), "storage initialized");
            Arc::new(s)
        }
        Err(e) => {
            error!("failed to initialize storage: {e}");
            std::process::exit(1);
        }
    };

    let embedder: Arc<dyn engram_core::EmbeddingProvider> = Arc::new(HashingEmbedder::new(EMBEDDING_DIMENSIONS));
    let extractor: Arc<dyn engram_core::StructuredExtractor> = Arc::new(NullExtractor);
    let chat_model: Arc<dyn engram_core::ChatModel> = Arc::new(EchoChatModel);
    let object_store: Arc<dyn engram_core::ObjectStore> = Arc::new(LocalObjectStore::new(config.object_store_root.clone()));

    let orchestrator = match Orchestrator::new(storage.clone(), embedder, extractor, chat_model, object_store) {
        Ok(o) => Arc::new(o),
        Err(e) => {
            error!("failed to build orchestrator: {e}");
            std::process::exit(1);
        }
    };

    // Sweep episodic decay on an interval, matching the teacher's periodic
    // maintenance task shape (spec section 4.5's "Decay Sweep").
    {
        let decay_storage = storage.clone();
        let interval_hours = config.decay_interval_hours.max(1);
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            loop {
                match engram_core::ltm::decay::run(&decay_storage, chrono::Utc::now()) {
                    Ok(count) => info!(memories_decayed = count, "episodic decay sweep complete"),
                    Err(e) => tracing::warn!("episodic decay sweep failed: {e}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(interval_hours * 3600)).await;
            }
        });
    }

    let app = Router::new()
        .route("/", get(handle_liveness))
        .route("/model", post(handle_model))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { orchestrator });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], config.port)));

    info!(%addr, "listening");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        std::process::exit(1);
    }

    info!("engram-server shutting down");
}
