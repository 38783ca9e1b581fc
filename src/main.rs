// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Mailer Service
//!
//! Receives contact form submissions from the portfolio frontend and
//! sends an owner notification plus a submitter confirmation.
//!
//! ## Endpoints
//!
//! - `POST /api/send-email`: submit the contact form
//! - `GET /api/health`: liveness probe
//! - `GET /api/test`: smoke test
//! - `GET /metrics`: Prometheus metrics (configurable)
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables, optionally seeded
//! from a `.env` file:
//!
//! - `PORT` / `BIND_ADDR`: listen address (default: 0.0.0.0:3001)
//! - `EMAIL_SERVICE`: mail service (default: gmail; `console` logs mail)
//! - `EMAIL_USER`, `EMAIL_PASS`: mail account credentials
//! - `OWNER_EMAIL`: notification recipient (default: `EMAIL_USER`)
//! - `FRONTEND_URL`: allowed CORS origin (default: `*`)
//! - `RATE_LIMIT_MAX`, `RATE_LIMIT_WINDOW_MS`: admission policy (default: 5 per hour)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_mailer::{
    config::Config,
    handlers::{router, AppState},
    limiter::SlidingWindowLimiter,
    mailer::{ConsoleMailer, MailDispatcher, NotificationSaga, SmtpMailer},
    metrics::Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "Failed to read .env file");
        }
    }

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        mail_service = %config.mail.service,
        frontend_url = %config.cors.frontend_url,
        "Starting contact mailer"
    );

    let dispatcher: Arc<dyn MailDispatcher> = if config.mail.is_console() {
        warn!("Console mail dispatcher selected, no email will be delivered");
        Arc::new(ConsoleMailer)
    } else {
        Arc::new(SmtpMailer::new(&config.mail).context("failed to configure SMTP transport")?)
    };
    let owner_address = config
        .mail
        .owner_address()
        .unwrap_or("owner@localhost")
        .to_string();

    let limiter = Arc::new(SlidingWindowLimiter::new());
    let metrics = Metrics::new().context("failed to register metrics")?;

    let state = Arc::new(AppState {
        limiter: limiter.clone(),
        saga: NotificationSaga::new(dispatcher, owner_address),
        metrics,
        config: config.clone(),
    });

    // Spawn cleanup task for idle client windows
    let window = config.rate_limit.window();
    let mut interval = tokio::time::interval(config.rate_limit.cleanup_interval());
    tokio::spawn(async move {
        loop {
            interval.tick().await;
            limiter.cleanup(window).await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
