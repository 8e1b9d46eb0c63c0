use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use screening_ai::config::AppConfig;
use screening_ai::error::AppError;
use screening_ai::offline::{predict_router, OfflineClassification, OfflinePipeline};
use screening_ai::screening::oracle::GeminiOracle;
use screening_ai::screening::session::{screening_router, InMemorySessionStore};
use screening_ai::screening::ScreeningService;
use screening_ai::telemetry;
use screening_ai::transcript::{TranscriptLog, TranscriptRecord};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

const DEFAULT_TRANSCRIPT_PATH: &str = "logs/phq9_chatbot_sessions.csv";

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "PHQ-9 Screening Assistant",
    about = "Run the conversational PHQ-9 screening service or classify a completed questionnaire",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify nine free-text answers with the offline model
    Predict(PredictArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Override the configured classifier artifact directory
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// One free-text answer per PHQ item, in Q1..Q9 order (repeat 9 times)
    #[arg(long = "answer")]
    answers: Vec<String>,
    /// Number of top predictions to display
    #[arg(long, default_value_t = 5)]
    top_k: usize,
    /// Override the configured classifier artifact directory
    #[arg(long)]
    model_dir: Option<PathBuf>,
    /// Optional age recorded in the transcript log
    #[arg(long, default_value = "")]
    age: String,
    /// Optional gender recorded in the transcript log
    #[arg(long, default_value = "")]
    gender: String,
    /// Consent to appending this session to the local transcript log
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Predict(args) => run_predict(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(model_dir) = args.model_dir.take() {
        config.offline.model_dir = Some(model_dir);
    }

    telemetry::init(&config.telemetry)?;

    let api_key = config.oracle.require_key()?.to_string();
    let oracle = Arc::new(GeminiOracle::new(&config.oracle, api_key)?);
    let store = Arc::new(InMemorySessionStore::default());
    let service = Arc::new(ScreeningService::new(oracle, store));

    // A configured-but-unloadable bundle refuses to serve; an unconfigured
    // one simply leaves the offline endpoint unmounted.
    let pipeline = match &config.offline.model_dir {
        Some(dir) => {
            let pipeline = OfflinePipeline::from_artifact_dir(dir)?;
            info!(model_dir = %dir.display(), labels = pipeline.labels().len(), "offline classifier loaded");
            Some(Arc::new(pipeline))
        }
        None => None,
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let mut app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(screening_router(service));

    if let Some(pipeline) = pipeline {
        app = app.merge(predict_router(pipeline));
    }

    let app = app.layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "screening assistant ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let model_dir = args
        .model_dir
        .or(config.offline.model_dir)
        .ok_or(screening_ai::config::ConfigError::MissingModelDir)?;
    let pipeline = OfflinePipeline::from_artifact_dir(&model_dir)?;

    let result = pipeline.predict_from_answers(&args.answers, args.top_k, false)?;
    render_prediction(&result);

    if args.save {
        let path = config
            .offline
            .transcript_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT_PATH));
        let log = TranscriptLog::new(path);
        log.append(&TranscriptRecord {
            age: &args.age,
            gender: &args.gender,
            answers: &args.answers,
            classification: &result,
        })?;
        println!("\nSession saved to: {}", log.path().display());
    } else {
        println!("\nSession not saved (pass --save to consent).");
    }

    Ok(())
}

fn render_prediction(result: &OfflineClassification) {
    println!("=== Results ===");
    println!(
        "Predicted depression level: {} (class index {})",
        result.label, result.label_idx
    );

    println!("\nTop predictions:");
    for entry in &result.topk {
        println!(
            "  {:20} prob={:.4} (idx={})",
            entry.label, entry.prob, entry.index
        );
    }

    if result.q9_suicidal_flag {
        println!("\nIMPORTANT: the answer to Q9 contains language that may indicate suicidal thoughts.");
        println!("If you are in immediate danger, call your local emergency number now.");
        println!("Consider contacting a mental health professional or a crisis hotline.");
    }

    let preview: String = result.concat_text.chars().take(300).collect();
    println!("\nConcatenated text (truncated): {preview}");
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
