//! Wave-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wave_api::{middleware::AppState, router as api_router};
use wave_common::Config;
use wave_core::{
    AccountService, ActivityLogService, DeletionService, ReportService, RetentionService,
    UnbanRequestService, VerificationService,
};
use wave_db::repositories::{
    AccountRepository, ActivityLogRepository, DeletedAccountRepository, ReportRepository,
    UnbanRequestRepository, VerificationRepository,
};
use wave_queue::{RetentionJobExecutor, SchedulerConfig, run_scheduler};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wave=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting wave-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = wave_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    wave_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let account_repo = AccountRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let unban_repo = UnbanRequestRepository::new(Arc::clone(&db));
    let verification_repo = VerificationRepository::new(Arc::clone(&db));
    let deleted_repo = DeletedAccountRepository::new(Arc::clone(&db));
    let activity_repo = ActivityLogRepository::new(Arc::clone(&db));

    // Initialize services
    let accounts = AccountService::new(
        Arc::clone(&db),
        account_repo.clone(),
        activity_repo.clone(),
        config.moderation.warning_threshold,
        config.moderation.admin_email.clone(),
    );
    let reports = ReportService::new(
        Arc::clone(&db),
        report_repo.clone(),
        accounts.clone(),
        activity_repo.clone(),
    );
    let unban_requests = UnbanRequestService::new(
        Arc::clone(&db),
        unban_repo,
        accounts.clone(),
        activity_repo.clone(),
    );
    let verifications = VerificationService::new(
        Arc::clone(&db),
        verification_repo,
        deleted_repo.clone(),
        accounts.clone(),
        activity_repo.clone(),
        config.moderation.retention_days,
    );
    let deletions = DeletionService::new(
        Arc::clone(&db),
        account_repo,
        report_repo.clone(),
        deleted_repo.clone(),
        activity_repo.clone(),
    );
    let retention = RetentionService::new(
        Arc::clone(&db),
        deleted_repo,
        report_repo,
        activity_repo.clone(),
        config.moderation.retention_days,
        config.moderation.sweep_chunk_size,
    );
    let activity = ActivityLogService::new(activity_repo);

    // Create app state
    let state = AppState {
        accounts,
        reports,
        unban_requests,
        verifications,
        deletions,
        activity,
    };

    // Start the retention sweeper
    info!("Starting retention sweeper...");
    let scheduler_config = SchedulerConfig {
        sweep_interval: Duration::from_secs(config.moderation.sweep_interval_secs),
    };
    run_scheduler(
        scheduler_config,
        Arc::new(RetentionJobExecutor::new(retention)),
    )
    .await;

    // Build router
    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            wave_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
