//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hire_types::MarketRepository;

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::MarketService;
use crate::openapi::ApiDoc;

/// HTTP Server for the hire marketplace API.
pub struct HttpServer<R: MarketRepository> {
    state: Arc<AppState<R>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R: MarketRepository> HttpServer<R> {
    /// Creates a new HTTP server allowing 100 requests per minute per caller.
    pub fn new(service: MarketService<R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(service: MarketService<R>, requests_per_minute: u32) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::per_minute(requests_per_minute)),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Uses the globally set MeterProvider
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/accounts", post(handlers::create_account::<R>))
            .route("/api/accounts/{id}", get(handlers::get_account::<R>))
            .route(
                "/api/accounts/by-username/{username}",
                get(handlers::get_account_by_username::<R>),
            )
            .route(
                "/api/accounts/{id}/payments",
                get(handlers::list_account_payments::<R>),
            )
            .route(
                "/api/accounts/{id}/hires",
                get(handlers::list_account_hires::<R>),
            )
            .route("/api/wallet/top-up", post(handlers::top_up::<R>))
            .route(
                "/api/wallet/top-up/pending",
                post(handlers::request_top_up::<R>),
            )
            .route("/api/wallet/withdraw", post(handlers::withdraw::<R>))
            .route("/api/payments", get(handlers::search_payments::<R>))
            .route(
                "/api/payments/{id}/confirm",
                post(handlers::confirm_payment::<R>),
            )
            .route("/api/payments/{id}/fail", post(handlers::fail_payment::<R>))
            .route(
                "/api/payments/{id}/refund",
                post(handlers::refund_payment::<R>),
            )
            .route("/api/hires", post(handlers::book_hire::<R>))
            .route("/api/hires/{id}", get(handlers::get_hire::<R>))
            .route("/api/hires/{id}/cancel", post(handlers::cancel_hire::<R>))
            .route("/api/hires/{id}/review", post(handlers::submit_review::<R>))
            .route("/api/players/{id}/stats", get(handlers::player_stats::<R>))
            .route(
                "/api/players/{id}/reviews",
                get(handlers::player_reviews::<R>),
            )
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone());

        api.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
