//! Integration tests for Huerto Hogar.
//!
//! Each test starts the complete storefront on an ephemeral port with a
//! private in-memory database and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p huerto-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Product listing, detail and the live stream
//! - `auth` - Registration, login and logout
//! - `cart` - Cart operations
//! - `admin` - Product editor

#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::{Value, json};

use huerto_storefront::config::StorefrontConfig;
use huerto_storefront::state::AppState;
use huerto_storefront::{build_router, build_state};

/// Admin account every test app starts with.
pub const ADMIN_EMAIL: &str = "admin@huertohogar.com";
/// Password of [`ADMIN_EMAIL`].
pub const ADMIN_PASSWORD: &str = "huerto-admin-2025";

/// A running storefront.
pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
    /// Client with its own cookie jar.
    pub client: Client,
}

impl TestApp {
    /// Start a storefront with the default test configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    /// Start a storefront, overriding configuration variables.
    pub async fn spawn_with(overrides: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = [
            ("STOREFRONT_DATABASE_URL", "sqlite::memory:"),
            ("STOREFRONT_RATE_LIMIT_AUTH", "false"),
            ("STOREFRONT_ADMIN_EMAIL", ADMIN_EMAIL),
            ("STOREFRONT_ADMIN_PASSWORD", ADMIN_PASSWORD),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        for (key, value) in overrides {
            vars.insert((*key).to_owned(), (*value).to_owned());
        }

        let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("test configuration");
        let state = build_state(config).await.expect("application state");
        let router = build_router(state.clone()).await.expect("router");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            client: new_client(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Wait until the live catalog has finished its first load.
    pub async fn catalog_loaded(&self) {
        let mut rx = self.state.catalog().subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| !s.loading))
            .await
            .expect("catalog loaded in time")
            .expect("catalog still running");
    }

    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client.get(self.url(path)).send().await.expect("GET")
    }

    pub async fn post(&self, client: &Client, path: &str, body: &Value) -> Response {
        client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST")
    }

    /// Register an account with matching passwords.
    pub async fn register(&self, client: &Client, email: &str, password: &str) -> Response {
        self.post(
            client,
            "/api/auth/register",
            &json!({ "email": email, "password": password, "password_confirm": password }),
        )
        .await
    }

    pub async fn login(&self, client: &Client, email: &str, password: &str) -> Response {
        self.post(
            client,
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// A new client, registered and signed in as a customer.
    pub async fn customer(&self, email: &str) -> Client {
        let client = new_client();
        let response = self.register(&client, email, "secreto1").await;
        assert_eq!(response.status(), 201, "register {email}");
        let response = self.login(&client, email, "secreto1").await;
        assert_eq!(response.status(), 200, "login {email}");
        client
    }

    /// A new client signed in as the default admin.
    pub async fn admin(&self) -> Client {
        let client = new_client();
        let response = self.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), 200, "admin login");
        client
    }
}

/// A client with an empty cookie jar.
#[must_use]
pub fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("http client")
}

/// Read a JSON body.
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("JSON body")
}
