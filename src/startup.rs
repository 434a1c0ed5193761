//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::events::{EventPool, EventPublisher};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub events: EventPublisher,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: PgPool, events: EventPublisher, settings: Settings) -> Self {
        Self {
            db,
            events,
            settings: Arc::new(settings),
        }
    }
}

/// Build the router with middleware applied.
pub fn build_router(state: AppState) -> Router {
    let cors = create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    events: EventPool,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        // Start the background notification worker
        let events = EventPool::start(settings.events.queue_capacity);
        tracing::info!(capacity = settings.events.queue_capacity, "Event pool started");

        let addr = settings.server_addr();
        let state = AppState::new(db, events.publisher(), settings);
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            events,
        })
    }

    /// Run the server until a shutdown signal arrives, then drain the
    /// event queue.
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("HTTP server stopped, draining events");
        self.events.shutdown().await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
