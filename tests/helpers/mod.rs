#![allow(dead_code)]

use std::{
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use eventdesk::{AppState, config::JwtConfig, create_app};
use eventdesk_lifecycle::Lifecycle;
use eventdesk_notification::{Notification, NotificationKind, Notifier};
use eventdesk_payment::{GatewayOrder, PaymentGateway};
use eventdesk_shared::{Contact, State};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tower::ServiceExt;

pub const GATEWAY_SECRET: &str = "test_secret";

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let write_db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts.clone())
        .await?;
    eventdesk::db::run_migrations(&write_db).await?;

    let read_db = SqlitePool::connect_with(opts).await?;

    Ok(State::new(read_db, write_db))
}

/// Issues `order_{receipt}_{n}` ids and checks signatures with the real HMAC.
#[derive(Default)]
pub struct FakeGateway {
    orders: AtomicU32,
}

#[async_trait::async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> eventdesk_shared::Result<GatewayOrder> {
        let n = self.orders.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(GatewayOrder {
            id: format!("order_{receipt}_{n}"),
            amount: amount_minor,
            currency: currency.to_owned(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_ref: &str, signature: &str) -> bool {
        eventdesk_payment::verify_signature(GATEWAY_SECRET, order_id, payment_ref, signature)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationKind>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, _recipient: &Contact, notification: &Notification) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(notification.kind());

        Ok(())
    }
}

pub fn jwt() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_minimum_32_characters_long".to_owned(),
        expiration_days: 1,
    }
}

pub struct TestServer {
    pub app: Router,
    pub lifecycle: Lifecycle,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestServer {
    pub async fn new(path: PathBuf) -> anyhow::Result<Self> {
        let state = setup_test_state(path).await?;
        let notifier = Arc::new(RecordingNotifier::default());
        let lifecycle = Lifecycle::new(state, notifier.clone(), Arc::new(FakeGateway::default()), "INR");

        lifecycle
            .users
            .ensure_admin("Root", "root@eventdesk.localhost", "rootpass")
            .await?;

        let app = create_app(AppState {
            lifecycle: lifecycle.clone(),
            jwt: jwt(),
        });

        Ok(Self {
            app,
            lifecycle,
            notifier,
        })
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.request(method, uri, None, body).await
    }

    /// Same as `send`, with `token` as bearer.
    pub async fn send_as(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.request(method, uri, Some(token), body).await
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => request.body(Body::empty())?,
        };

        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }

    /// Signs up `{name}@eventdesk.localhost` and returns a bearer token.
    pub async fn sign_up(&self, name: &str) -> anyhow::Result<String> {
        let email = format!("{}@eventdesk.localhost", name.to_lowercase());
        let (status, _) = self
            .send(
                "POST",
                "/auth/sign-up",
                Some(serde_json::json!({ "name": name, "email": email, "password": "secret1" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "sign-up returned {status}");

        self.login(&email, "secret1").await
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let (status, body) = self
            .send(
                "POST",
                "/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login returned {status}");

        body["token"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("login response has no token"))
    }
}
