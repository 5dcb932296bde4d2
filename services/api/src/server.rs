use crate::cli::ServeArgs;
use crate::infra::{backend_client, load_config, AppState};
use crate::routes::with_gateway_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cloudready::error::AppError;
use cloudready::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs, backend_url: Option<String>) -> Result<(), AppError> {
    let mut config = load_config(backend_url)?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let client = backend_client(&config)?;
    let app = with_gateway_routes(client)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = %config.backend.base_url,
        "cloud readiness gateway ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
