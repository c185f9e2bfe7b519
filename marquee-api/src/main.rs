use chrono::Duration;
use marquee_api::{app, state::AppState, worker};
use marquee_engine::{EngineRules, ReservationEngine};
use marquee_store::{DbClient, PostgresBookingRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,marquee_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = marquee_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    // Venue layout, exported by the metadata collaborator.
    let layout_json =
        std::fs::read_to_string(&config.layout.path).expect("Failed to read layout file");
    let sections: Vec<marquee_layout::SectionSpec> =
        serde_json::from_str(&layout_json).expect("Failed to parse layout file");
    let catalogue =
        Arc::new(marquee_layout::generate(&sections).expect("Failed to generate seat catalogue"));
    tracing::info!("Seat catalogue generated: {} seats", catalogue.len());

    // Durable booking ledger.
    let db = DbClient::connect(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let repo = Arc::new(PostgresBookingRepository::new(db.pool.clone()));

    let rules = EngineRules {
        hold_ttl: Duration::seconds(config.business_rules.hold_ttl_seconds as i64),
        reopen_window: Duration::minutes(config.business_rules.reopen_window_minutes as i64),
        terminal_hold_retention: Duration::seconds(
            config.business_rules.hold_retention_seconds as i64,
        ),
    };
    let engine = Arc::new(ReservationEngine::new(catalogue, repo, rules));

    tokio::spawn(worker::start_hold_reaper(
        engine.clone(),
        config.business_rules.reaper_interval_seconds,
    ));

    let app = app(AppState { engine });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
