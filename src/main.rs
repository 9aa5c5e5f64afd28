use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use chords_core::CoreConfig;
use chords_core::config::{data_dir_from_env_value, simulated_latency_from_env_value};

/// Main entry point for the CHORDS service
///
/// Serves the doctor-access REST API, backed by the in-process simulation, on
/// `CHORDS_REST_ADDR` (default "0.0.0.0:3000").
///
/// # Environment Variables
/// - `CHORDS_REST_ADDR`: REST server address
/// - `CHORDS_DATA_DIR`: Directory for locally persisted state (default: ".chords")
/// - `CHORDS_SIMULATED_LATENCY_MS`: Delay applied to every simulated call (default: 1000)
/// - `API_KEY`: When set, `/api` requests must carry it as a bearer token
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chords_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CHORDS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("CHORDS_DATA_DIR").ok()),
        simulated_latency_from_env_value(std::env::var("CHORDS_SIMULATED_LATENCY_MS").ok())?,
    )?
    .with_api_token(std::env::var("API_KEY").ok());

    if cfg.api_token().is_none() {
        tracing::warn!("API_KEY not set, /api routes are open");
    }
    tracing::info!(
        latency_ms = cfg.simulated_latency().as_millis() as u64,
        "++ Starting CHORDS REST on {}",
        rest_addr
    );

    let app = router(AppState::from_config(&cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
