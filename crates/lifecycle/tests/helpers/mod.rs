#![allow(dead_code)]

use std::{
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::Duration,
};

use eventdesk_event::CreateEventInput;
use eventdesk_lifecycle::Lifecycle;
use eventdesk_notification::{Notification, NotificationKind, Notifier};
use eventdesk_payment::{GatewayOrder, PaymentGateway};
use eventdesk_shared::{Caller, Contact, Error, Money, Role, State};
use eventdesk_user::SignUpInput;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use sqlx_migrator::{Migrate, Plan};

pub const SECRET: &str = "test_secret";

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let write_db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts.clone())
        .await?;
    let mut conn = write_db.acquire().await?;
    eventdesk_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;
    drop(conn);

    let read_db = SqlitePool::connect_with(opts).await?;

    Ok(State::new(read_db, write_db))
}

/// Issues sequential order ids and checks signatures with the real HMAC.
#[derive(Default)]
pub struct FakeGateway {
    orders: AtomicU32,
    pub unreachable: AtomicBool,
}

#[async_trait::async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        _receipt: &str,
    ) -> eventdesk_shared::Result<GatewayOrder> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::gateway("connection refused", true));
        }

        let n = self.orders.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(GatewayOrder {
            id: format!("order_EventDesk{n}"),
            amount: amount_minor,
            currency: currency.to_owned(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_ref: &str, signature: &str) -> bool {
        eventdesk_payment::verify_signature(SECRET, order_id, payment_ref, signature)
    }
}

/// Keeps every notification it is given; fails on demand.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, NotificationKind)>>,
    pub failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, NotificationKind)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent().into_iter().map(|(_, kind)| kind).collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &Contact, notification: &Notification) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("smtp unavailable");
        }

        self.sent
            .lock()
            .unwrap()
            .push((recipient.email.to_owned(), notification.kind()));

        Ok(())
    }
}

pub struct TestApp {
    pub lifecycle: Lifecycle,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<FakeGateway>,
    pub admin: Caller,
}

impl TestApp {
    pub async fn new(path: PathBuf) -> anyhow::Result<Self> {
        let state = setup_test_state(path).await?;
        let notifier = Arc::new(RecordingNotifier::default());
        let gateway = Arc::new(FakeGateway::default());
        let lifecycle = Lifecycle::new(state, notifier.clone(), gateway.clone(), "INR");

        let admin_id = lifecycle
            .users
            .ensure_admin("Root", "root@eventdesk.localhost", "rootpass")
            .await?;

        Ok(Self {
            lifecycle,
            notifier,
            gateway,
            admin: Caller::new(admin_id, Role::Admin),
        })
    }

    pub async fn user(&self, name: &str) -> anyhow::Result<Caller> {
        let id = self
            .lifecycle
            .users
            .sign_up(SignUpInput {
                name: name.to_owned(),
                email: format!("{}@eventdesk.localhost", name.to_lowercase()),
                password: "secret1".to_owned(),
                phone: None,
            })
            .await?;

        Ok(Caller::new(id, Role::User))
    }

    pub async fn free_event(&self, title: &str, max_participants: i64) -> anyhow::Result<String> {
        Ok(self
            .lifecycle
            .create_event(&self.admin, event_input(title, max_participants))
            .await?)
    }

    pub async fn paid_event(&self, title: &str, price: &str) -> anyhow::Result<String> {
        let mut input = event_input(title, 50);
        input.is_paid = true;
        input.price = price.parse::<Money>()?;

        Ok(self.lifecycle.create_event(&self.admin, input).await?)
    }

    pub async fn current_participants(&self, event_id: &str) -> anyhow::Result<i64> {
        let event = self
            .lifecycle
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("event {event_id} not found"))?;

        Ok(event.current_participants)
    }
}

pub fn event_input(title: &str, max_participants: i64) -> CreateEventInput {
    CreateEventInput {
        title: title.to_owned(),
        description: format!("{title} description"),
        date: "2099-06-01".to_owned(),
        time: "18:00".to_owned(),
        venue: "Main hall".to_owned(),
        category: "tech".to_owned(),
        price: Money::ZERO,
        is_paid: false,
        max_participants,
        registration_deadline: None,
    }
}
