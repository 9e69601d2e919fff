//! HTTP server wiring

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use eventdesk_lifecycle::Lifecycle;
use eventdesk_notification::{EmailService, LogNotifier, Notifier};
use eventdesk_payment::RazorpayGateway;
use eventdesk_shared::State;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    config::{Config, JwtConfig},
    routes::{admin, auth, events, health, me, payments},
};

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Lifecycle,
    pub jwt: JwtConfig,
}

/// Builds the orchestrator with the collaborators the configuration asks
/// for: SMTP or log-only notifications, and the hosted payment gateway.
pub fn build_lifecycle(config: &Config, state: State) -> anyhow::Result<Lifecycle> {
    let notifier: Arc<dyn Notifier> = if config.email.enabled {
        let email = eventdesk_notification::EmailConfig::from(&config.email);
        Arc::new(EmailService::new(&email)?)
    } else {
        tracing::info!("email disabled, notifications are only logged");
        Arc::new(LogNotifier)
    };

    let gateway = RazorpayGateway::new(eventdesk_payment::RazorpayConfig::from(&config.gateway))?;

    Ok(Lifecycle::new(
        state,
        notifier,
        Arc::new(gateway),
        &config.gateway.currency,
    ))
}

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/auth/sign-up", post(auth::post_sign_up))
        .route("/auth/login", post(auth::post_login))
        .route("/events", get(events::get_events))
        .route("/events/{id}", get(events::get_event))
        .route("/events/{id}/register", post(events::post_register))
        .route("/events/{id}/cancel", post(events::post_cancel))
        .route("/me", get(me::get_me).post(me::post_me))
        .route("/me/registrations", get(me::get_my_registrations))
        .route("/me/payments", get(me::get_my_payments))
        .route("/registrations/{id}/payment", post(payments::post_initiate))
        .route("/payments/{id}", get(payments::get_payment))
        .route("/payments/{id}/complete", post(payments::post_complete))
        .route("/payments/{id}/fail", post(payments::post_fail))
        .route("/admin/dashboard", get(admin::get_dashboard))
        .route("/admin/events", post(admin::post_create_event))
        .route(
            "/admin/events/{id}",
            post(admin::post_update_event).delete(admin::delete_event),
        )
        .route(
            "/admin/events/{id}/participants",
            get(admin::get_participants),
        )
        .route("/admin/events/{id}/payments", get(admin::get_event_payments))
        .route("/admin/users", get(admin::get_users))
        .route("/admin/reconcile", post(admin::post_reconcile))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Start the web server
#[tracing::instrument(skip(config))]
pub async fn serve(config: Config, host: String, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting eventdesk server...");

    let state =
        crate::db::create_state(&config.database.url, config.database.max_connections).await?;
    crate::db::run_migrations(&state.write_db).await?;

    let lifecycle = build_lifecycle(&config, state)?;

    if let Some(root) = &config.root {
        let id = lifecycle
            .users
            .ensure_admin(&root.name, &root.email, &root.password)
            .await?;
        tracing::info!(user_id = %id, email = %root.email, "root account ready");
    }

    let report = lifecycle.reconcile().await?;
    if report.repaired > 0 || !report.cancelled_with_payment.is_empty() {
        tracing::warn!(
            repaired = report.repaired,
            cancelled_with_payment = report.cancelled_with_payment.len(),
            "reconciled payments on start-up"
        );
    }

    let app = create_app(AppState {
        lifecycle,
        jwt: config.jwt.clone(),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutdown signal received");
}
