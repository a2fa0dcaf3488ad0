use std::sync::Arc;

use quiz_assist::assistant::OpenAiAssistant;
use quiz_assist::config::{GenerationConfig, ServerConfig};
use quiz_assist::pipeline::GenerationPipeline;
use quiz_assist::routes::{AppState, api_routes};
use quiz_assist::store::{LibSqlBackend, QuestionStore};
use quiz_assist::tasks::TaskRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read credentials from environment
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });
    let assistant_id = std::env::var("QUIZ_ASSIST_ASSISTANT_ID").unwrap_or_else(|_| {
        eprintln!("Error: QUIZ_ASSIST_ASSISTANT_ID not set");
        eprintln!("  export QUIZ_ASSIST_ASSISTANT_ID=asst_...");
        std::process::exit(1);
    });

    let server_config = ServerConfig::from_env()?;
    let mut generation_config = GenerationConfig::new(assistant_id);
    if let Ok(batch) = std::env::var("QUIZ_ASSIST_BATCH_SIZE") {
        generation_config.batch_size = batch.parse().unwrap_or(generation_config.batch_size);
    }

    eprintln!("📚 Quiz Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", server_config.port);
    eprintln!("   Database: {}", server_config.db_path);

    // ── Database ─────────────────────────────────────────────────────
    let db_path = std::path::Path::new(&server_config.db_path);
    let store: Arc<dyn QuestionStore> =
        Arc::new(LibSqlBackend::new_local(db_path).await.unwrap_or_else(|e| {
            eprintln!(
                "Error: Failed to open database at {}: {}",
                server_config.db_path, e
            );
            std::process::exit(1);
        }));

    // ── Generation pipeline ─────────────────────────────────────────
    let assistant = Arc::new(OpenAiAssistant::new(secrecy::SecretString::from(api_key)));
    let registry = TaskRegistry::new();
    let pipeline = GenerationPipeline::new(
        Arc::clone(&store),
        assistant,
        Arc::clone(&registry),
        generation_config,
    );

    // ── HTTP server ─────────────────────────────────────────────────
    let app = api_routes(AppState {
        pipeline,
        registry,
        store,
    });

    let listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server_config.port)).await?;
    tracing::info!(port = server_config.port, "API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
