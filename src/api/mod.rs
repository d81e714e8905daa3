use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    HolidayService, SeaOrmHolidayService, SeaOrmUserService, UniqueVisitorsMetric,
    UserService, VisitorCounter,
};

pub mod auth;
mod error;
mod holidays;
mod observability;
mod system;
mod types;
mod users;
mod validation;
pub mod visitors;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub holidays: Arc<dyn HolidayService>,

    pub users: Arc<dyn UserService>,

    pub visitors: Arc<VisitorCounter>,

    /// Parsed `server.trusted_proxy_ips`
    pub trusted_proxies: Vec<IpAddr>,

    pub start_time: Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Wires services around an open store.
///
/// The visitor metric is owned by the caller so that it outlives any single
/// state; the counter is reconciled with the persisted total here.
pub async fn create_app_state(
    config: Config,
    store: Store,
    metric: Arc<UniqueVisitorsMetric>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let trusted_proxies = config
        .server
        .trusted_proxy_ips
        .iter()
        .map(|ip| {
            ip.parse::<IpAddr>()
                .map(|ip| ip.to_canonical())
                .map_err(|e| anyhow::anyhow!("Invalid trusted proxy IP {ip}: {e}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let holidays: Arc<dyn HolidayService> = Arc::new(SeaOrmHolidayService::new(store.clone()));
    let users: Arc<dyn UserService> = Arc::new(SeaOrmUserService::new(
        store.clone(),
        config.security.clone(),
    ));

    let visitors = Arc::new(VisitorCounter::new(store.clone(), metric));
    visitors
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize visitor counter: {e}"))?;

    Ok(Arc::new(AppState {
        config,
        store,
        holidays,
        users,
        visitors,
        trusted_proxies,
        start_time: Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    create_app_state(
        config,
        store,
        Arc::new(UniqueVisitorsMetric::new()),
        prometheus_handle,
    )
    .await
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config.server.cors_allowed_origins;

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(create_public_router())
        .merge(create_protected_router(state.clone()))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        // Outside CORS so that preflight requests are counted too
        .layer(middleware::from_fn_with_state(
            state.clone(),
            visitors::visitor_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::server_timing_middleware,
        ))
        .with_state(state)
}

fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/holidays", get(holidays::list_holidays))
        .route("/holidays/{id}", get(holidays::get_holiday))
        .route("/health", get(system::health))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::replace_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/password", patch(users::change_password))
        .route("/holidays", post(holidays::create_holiday))
        .route(
            "/holidays/{id}",
            put(holidays::replace_holiday)
                .patch(holidays::update_holiday)
                .delete(holidays::delete_holiday),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
