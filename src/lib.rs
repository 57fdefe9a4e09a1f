//! Newsletter signup service for the Krewe de Vélorévolte website.
//!
//! Serves `POST /api/newsletter-subscribe`, which validates an email address and
//! subscribes it to the krewe's Mailjet contact list.

pub mod app;
pub mod config;
mod error;
pub mod list_provider;
pub mod mailjet_client;
pub mod subscription;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use mailjet_client::MailjetClient;
pub use web::serve::serve;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Human readable tracing for local development.
/// Honors `RUST_LOG`, defaults to `debug`.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .compact()
        .init();
}

/// JSON tracing for production, one object per line.
/// Honors `RUST_LOG`, defaults to `info`.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
