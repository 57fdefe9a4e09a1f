//! Spawns the app on a random port, with Mailjet replaced by a `wiremock` server.
use std::{net::SocketAddr, sync::OnceLock};

use anyhow::Result;
use krewe_newsletter::{
    config::{get_or_init_config, AppConfig},
    init_dbg_tracing, App,
};
use secrecy::SecretString;
use serde_json::Value;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_SECRET_KEY: &str = "test-secret-key";
pub const TEST_LIST_ID: &str = "10245";

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub mailjet_server: MockServer,
}

/// Set `TEST_LOG` to see the app's tracing output while running tests.
fn init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_dbg_tracing();
        }
    });
}

impl TestApp {
    /// Spawns the app with a complete set of Mailjet credentials.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the app after letting `customize` change the test configuration.
    pub async fn spawn_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        init_test_subscriber();

        let mailjet_server = MockServer::start().await;

        let mut config = get_or_init_config().clone();
        // Trying to bind port 0 will trigger an OS scan for an available port
        config.net_config.host = [127, 0, 0, 1];
        config.net_config.app_port = 0;
        config.mailjet_config.base_url = mailjet_server.uri();
        config.mailjet_config.timeout_millis = 200;
        config.mailjet_config.api_key = Some(SecretString::from(TEST_API_KEY.to_string()));
        config.mailjet_config.secret_key = Some(SecretString::from(TEST_SECRET_KEY.to_string()));
        config.mailjet_config.contact_list_id = Some(TEST_LIST_ID.to_string());
        customize(&mut config);

        let app = App::build_from_config(config).await?;
        let addr = app.listener.local_addr()?;

        tokio::spawn(krewe_newsletter::serve(app));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            mailjet_server,
        })
    }

    pub async fn post_subscribe(&self, body: &Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/api/newsletter-subscribe", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    /// Sends `body` as is, with a JSON content type.
    pub async fn post_subscribe_raw(
        &self,
        body: impl Into<reqwest::Body>,
    ) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/api/newsletter-subscribe", self.addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        Ok(res)
    }
}

pub fn manage_contact_path() -> String {
    format!("/contactslist/{TEST_LIST_ID}/managecontact")
}
