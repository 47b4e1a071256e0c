use crate::cli::ServeArgs;
use crate::infra::{AppState, PortalServices};
use crate::routes::portal_routes;
use academy_portal::config::AppConfig;
use academy_portal::error::AppError;
use academy_portal::store::PortalStore;
use academy_portal::telemetry;
use academy_portal::workflows::admissions::ReviewPolicy;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(PortalStore::from_config(&config.store)?);
    let services = PortalServices::new(store.clone(), ReviewPolicy::from(&config.review));

    let app = portal_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = store.label(),
        require_reviewer = config.review.require_reviewer,
        "academy portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
