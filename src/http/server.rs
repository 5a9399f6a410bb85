//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared [`AppState`] (stores, verifier, alerts, upstream client)
//! - Create the Axum router: admin routes, upstream fallback
//! - Wire up middleware (request gate, timeout, request ID, tracing)
//! - Run the server and the record sweeper until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, middleware, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::{setup_admin_router, PasswordCheck, TokenVerifier};
use crate::alerts::Alerts;
use crate::config::GateConfig;
use crate::http::forward::{forward_handler, Upstream};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::{recv_shutdown, Shutdown};
use crate::security::clock::Clock;
use crate::security::counter_store::InMemoryCounterStore;
use crate::security::login_throttle::LoginThrottle;
use crate::security::rate_limit::ApiRateLimiter;
use crate::security::sweeper::Sweeper;
use crate::security::{gate_middleware, Gate};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub gate: Arc<Gate>,
    pub counters: Arc<InMemoryCounterStore>,
    pub throttle: Arc<LoginThrottle>,
    pub verifier: Arc<TokenVerifier>,
    pub password: Arc<PasswordCheck>,
    pub alerts: Alerts,
    pub clock: Arc<dyn Clock>,
    pub upstream: Option<Upstream>,
    pub client: Client<HttpConnector, Body>,
}

impl AppState {
    pub fn new(config: GateConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_store(config, Arc::new(InMemoryCounterStore::new()), clock)
    }

    /// Build around an existing counter store.
    pub fn with_store(config: GateConfig, counters: Arc<InMemoryCounterStore>, clock: Arc<dyn Clock>) -> Self {
        let limiter = Arc::new(ApiRateLimiter::new(
            counters.clone(),
            config.rate_limit.clone(),
            clock.clone(),
        ));
        let gate = Arc::new(Gate::new(&config, limiter, clock.clone()));
        let throttle = Arc::new(LoginThrottle::new(&config.login, clock.clone()));
        let verifier = Arc::new(TokenVerifier::new(&config.admin, clock.clone()));
        let password = Arc::new(PasswordCheck::from_config(&config.admin));
        let outbound = Duration::from_secs(config.timeouts.outbound_secs);
        let alerts = Alerts::new(&config.alerts, outbound);

        let upstream = config.upstream.url.as_deref().and_then(|url| match Upstream::parse(url) {
            Ok(upstream) => Some(upstream),
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Ignoring invalid upstream URL");
                None
            }
        });

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            config: Arc::new(config),
            gate,
            counters,
            throttle,
            verifier,
            password,
            alerts,
            clock,
            upstream,
            client,
        }
    }
}

/// Router with every route and middleware layer.
#[allow(deprecated)]
pub fn build_app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

    setup_admin_router()
        .fallback(forward_handler)
        .layer(middleware::from_fn_with_state(state.gate.clone(), gate_middleware))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

/// HTTP server for the gate.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = self.state.config.environment.as_str(),
            upstream = ?self.state.config.upstream.url,
            "HTTP server starting"
        );

        let sweeper = Sweeper::new(
            self.state.counters.clone(),
            self.state.throttle.clone(),
            self.state.clock.clone(),
            Duration::from_secs(self.state.config.rate_limit.sweep_interval_secs),
        );
        tokio::spawn(sweeper.run(shutdown.subscribe()));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(recv_shutdown(shutdown.subscribe()))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
