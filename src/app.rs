use std::time::Duration;

use anyhow::Context;
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use crate::routes;
use crate::services::prediction_service::PredictionService;
use crate::services::sentiment_service::SentimentClient;
use crate::services::tick_data_service::TickDataService;
use crate::utils::config::{AppConfig, DatabaseConfig, RewriteRule, UpstreamsConfig};
use crate::utils::middleware;
use crate::utils::upstream::{UpstreamClient, UpstreamError};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub predictions: PredictionService,
    pub gtt: UpstreamClient,
    pub tick_data: TickDataService,
    pub sentiment: SentimentClient,
    pub market_data: UpstreamClient,
}

impl AppState {
    pub fn new(db_pool: DbPool, upstreams: &UpstreamsConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            db_pool,
            predictions: PredictionService::new(UpstreamClient::new("prediction", &upstreams.prediction)?),
            gtt: UpstreamClient::new("gtt", &upstreams.gtt)?,
            tick_data: TickDataService::new(UpstreamClient::new("tick-server", &upstreams.tick_server)?),
            sentiment: SentimentClient::new(UpstreamClient::new("sentiment", &upstreams.sentiment)?),
            market_data: UpstreamClient::new("market-data", &upstreams.market_data)?,
        })
    }
}

pub fn build_pool(cfg: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(&cfg.url);
    Pool::builder()
        .max_size(cfg.pool_size)
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
        .context("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("Failed to get DB connection for migrations")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
    for version in applied {
        tracing::info!("Applied migration {}", version);
    }
    Ok(())
}

pub fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let db_pool = build_pool(&config.database)?;
    if config.database.run_migrations {
        run_migrations(&db_pool)?;
    }
    let state = AppState::new(db_pool, &config.upstreams).context("Failed to build upstream clients")?;
    build_app_with_state(state, &config.upstreams.rewrites)
}

pub fn build_app_with_state(state: AppState, rewrites: &[RewriteRule]) -> anyhow::Result<Router> {
    let router = routes::build_routes(rewrites).context("Failed to build rewrite routes")?;

    Ok(router
        .with_state(state)
        .layer(middleware::cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        ))
}
