#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use rentdesk_api::config::AppConfig;
use rentdesk_api::database::DatabaseManager;
use rentdesk_api::{app, AppState};

pub const OWNER_SECRET: &str = "test-owner-secret";
pub const OWNER_EMAIL: &str = "owner@rentdesk.test";
pub const PASSWORD: &str = "secret123";

/// One server per test, each on its own port with its own in-memory database
pub struct TestApp {
    pub base_url: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.owner_secret_key = OWNER_SECRET.to_string();
        config.api.enable_request_logging = false;

        let pool = DatabaseManager::connect_in_memory().await?;
        DatabaseManager::migrate(&pool).await?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app(AppState::new(pool.clone(), config));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let app = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            pool,
            client: reqwest::Client::new(),
        };
        app.wait_ready(Duration::from_secs(10)).await?;
        Ok(app)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(reqwest::Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(reqwest::Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(reqwest::Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(reqwest::Method::DELETE, path, Some(token), None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.request(
            reqwest::Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Create the owner through the setup endpoint and return its token
    pub async fn owner_token(&self) -> Result<String> {
        let (status, body) = self
            .request(
                reqwest::Method::POST,
                "/auth/setup/owner",
                None,
                Some(json!({
                    "email": OWNER_EMAIL,
                    "password": PASSWORD,
                    "full_name": "Owner",
                    "secret_key": OWNER_SECRET
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "owner setup failed: {} {}", status, body);
        self.token_for(OWNER_EMAIL).await
    }

    /// Create an admin as the owner; returns (admin id, admin token)
    pub async fn admin(&self, owner_token: &str, email: &str, full_name: &str) -> Result<(String, String)> {
        let (status, body) = self
            .post(
                "/api/admins",
                owner_token,
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "full_name": full_name,
                    "phone": "+998901234567"
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "admin create failed: {} {}", status, body);
        let id = body["data"]["id"].as_str().context("admin id")?.to_string();
        Ok((id, self.token_for(email).await?))
    }

    pub async fn token_for(&self, email: &str) -> Result<String> {
        let (status, body) = self.login(email, PASSWORD).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        Ok(body["data"]["token"].as_str().context("token")?.to_string())
    }

    pub async fn warehouse(&self, admin_token: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/warehouses", admin_token, json!({ "name": name, "address": "Tashkent" }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "warehouse create failed: {} {}", status, body);
        Ok(body["data"]["id"].as_str().context("warehouse id")?.to_string())
    }

    pub async fn tenant(&self, admin_token: &str, warehouse_id: &str, name: &str, rent: i64) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/tenants",
                admin_token,
                json!({
                    "warehouse_id": warehouse_id,
                    "full_name": name,
                    "phone": "+998907654321",
                    "product_type": "Mebel",
                    "monthly_rent": rent
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "tenant create failed: {} {}", status, body);
        Ok(body["data"]["id"].as_str().context("tenant id")?.to_string())
    }

    pub async fn pay(&self, admin_token: &str, tenant_id: &str, month: u32, year: i32, paid: i64) -> Result<Value> {
        let (status, body) = self
            .post(
                "/api/payments",
                admin_token,
                json!({ "tenant_id": tenant_id, "month": month, "year": year, "paid_amount": paid }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "payment failed: {} {}", status, body);
        Ok(body["data"].clone())
    }
}
