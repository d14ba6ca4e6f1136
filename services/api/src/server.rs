use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryIdentityStore, InMemoryJobBoard, InMemoryPublishQueue};
use crate::routes::api_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use jobboard::adverts::{run_publish_job, AdvertRouterState, AdvertService};
use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::identity::IdentityService;
use jobboard::telemetry;

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

    let board = Arc::new(InMemoryJobBoard::default());
    let queue = Arc::new(InMemoryPublishQueue::default());
    let identity_store = Arc::new(InMemoryIdentityStore::default());
    let identity_service = Arc::new(IdentityService::new(
        identity_store.clone(),
        identity_store,
    ));
    let advert_service = Arc::new(AdvertService::new(board.clone(), queue.clone()));

    let advert_state = AdvertRouterState {
        service: advert_service,
        authenticator: identity_service.clone(),
        page_size: config.api.page_size,
    };

    let app = api_router(advert_state, identity_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    spawn_publish_worker(board, queue);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board api ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Local stand-in for the external worker pool: once a second, drain jobs
/// whose eta has passed and run the publish job body. A real deployment
/// points `PublishQueue` at a broker and this loop disappears with it.
fn spawn_publish_worker(board: Arc<InMemoryJobBoard>, queue: Arc<InMemoryPublishQueue>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            for job in queue.take_due(Utc::now()) {
                if let Err(error) = run_publish_job(board.as_ref(), &job.advert_id) {
                    warn!(advert_id = %job.advert_id.0, %error, "scheduled publish failed");
                }
            }
        }
    });
}
