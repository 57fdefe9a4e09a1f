use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{config::AppConfig, list_provider::ListProvider, MailjetClient, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let mailjet_config = &config.mailjet_config;

        // Missing credentials are not fatal, subscription requests get a configuration error.
        let list_provider: Option<Box<dyn ListProvider>> = match mailjet_config.credentials() {
            Some(credentials) => {
                let client = MailjetClient::new(
                    &mailjet_config.base_url,
                    credentials,
                    mailjet_config.timeout(),
                )?;
                Some(Box::new(client) as Box<dyn ListProvider>)
            }
            None => {
                warn!(
                    "{:<20} - Missing Mailjet credentials, subscriptions are disabled",
                    "app"
                );
                None
            }
        };

        let app_state = AppState::new(list_provider);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind the listener to {addr}"))?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    /// `None` when the provider credentials are incomplete.
    pub list_provider: Option<Box<dyn ListProvider>>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(list_provider: Option<Box<dyn ListProvider>>) -> Self {
        AppState(Arc::new(InternalState { list_provider }))
    }
}
