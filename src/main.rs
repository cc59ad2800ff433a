use homeward_plots::assistant::credentials::{CredentialSource, EnvCredentials};
use homeward_plots::config::AppConfig;
use homeward_plots::gemini_client::GeminiClient;
use homeward_plots::services::LogOtpSender;
use homeward_plots::{build_router, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let gemini_client = GeminiClient::new(config.gemini_base_url.clone(), config.gemini_timeout)
        .expect("Failed to build Gemini HTTP client");

    let credentials = Arc::new(EnvCredentials::default());
    if credentials.api_key().is_some() {
        tracing::info!(model = %config.gemini_model, "Gemini API key found, assistant is live");
    } else {
        tracing::warn!("GEMINI_API_KEY / API_KEY not set. The assistant answers in demo mode until a key is provided.");
    }

    let shared_state = Arc::new(AppState::new(
        &config,
        Arc::new(gemini_client),
        credentials,
        Arc::new(LogOtpSender),
    ));

    let app = build_router(shared_state);

    // ConnectInfo provides socket addresses for rate limiting
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>())
        .await
        .expect("Server error");
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,homeward_plots=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,homeward_plots=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Homeward Plots starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
