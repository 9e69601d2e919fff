use eventdesk_payment::{CreatePaymentInput, GATEWAY_METHOD, Store};
use eventdesk_shared::{Error, Money, PaymentStatus};
use temp_dir::TempDir;

mod helpers;

fn input(registration_id: &str, user_id: &str, event_id: &str, amount: i64) -> CreatePaymentInput {
    CreatePaymentInput {
        registration_id: registration_id.to_owned(),
        user_id: user_id.to_owned(),
        event_id: event_id.to_owned(),
        amount: Money::from_minor(amount),
        order_id: Some(format!("order_{registration_id}")),
        transaction_id: None,
        payment_method: GATEWAY_METHOD.to_owned(),
    }
}

#[tokio::test]
async fn test_create_starts_pending() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let id = store.create(input("r1", "u1", "e1", 49900)).await?;
    let payment = store.find(&id).await?.unwrap();

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, Money::from_minor(49900));
    assert_eq!(payment.order_id.as_deref(), Some("order_r1"));
    assert!(payment.transaction_id.is_none());

    let err = store.create(input("r2", "u1", "e1", 0)).await.unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));

    Ok(())
}

#[tokio::test]
async fn test_success_sets_transaction_and_is_unique() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let first = store.create(input("r1", "u1", "e1", 1000)).await?;
    let second = store.create(input("r1", "u1", "e1", 1000)).await?;

    assert_eq!(store.mark_success(&first, "pay_1").await?, 1);
    let payment = store.find_by_transaction_id("pay_1").await?.unwrap();
    assert_eq!(payment.id, first);
    assert!(payment.is_success());

    let err = store.mark_success(&second, "pay_2").await.unwrap_err();
    assert!(matches!(err, Error::AlreadyPaid));

    let other = store.create(input("r2", "u2", "e1", 1000)).await?;
    let err = store.mark_success(&other, "pay_1").await.unwrap_err();
    assert!(matches!(err, Error::AlreadyPaid));

    assert!(store.has_success("r1").await?);
    assert!(!store.has_success("r2").await?);

    Ok(())
}

#[tokio::test]
async fn test_fail_pending_leaves_settled_payments() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state.clone());

    let paid = store.create(input("r1", "u1", "e1", 1000)).await?;
    store.mark_success(&paid, "pay_1").await?;
    assert_eq!(eventdesk_payment::fail_pending(&state.write_db, &paid).await?, 0);

    let open = store.create(input("r2", "u1", "e1", 1000)).await?;
    assert_eq!(eventdesk_payment::fail_pending(&state.write_db, &open).await?, 1);
    assert_eq!(store.find(&open).await?.unwrap().status, PaymentStatus::Failed);

    assert_eq!(store.mark_failed("missing").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_find_by_registration_returns_latest() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state.clone());

    let first = store.create(input("r1", "u1", "e1", 1000)).await?;
    store.mark_failed(&first).await?;
    sqlx::query("UPDATE payment SET payment_date = payment_date - 60 WHERE id = ?")
        .bind(&first)
        .execute(&state.write_db)
        .await?;
    let second = store.create(input("r1", "u1", "e1", 1000)).await?;

    let latest = store.find_by_registration("r1").await?.unwrap();
    assert_eq!(latest.id, second);
    assert!(store.find_by_registration("r9").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_revenue_and_listings() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state.clone());

    helpers::insert_event(&state, "e1", "Rust meetup").await?;
    helpers::insert_user(&state, "u1", "Ada").await?;
    helpers::insert_user(&state, "u2", "Grace").await?;

    assert_eq!(store.total_revenue("e1").await?, Money::ZERO);

    let a = store.create(input("r1", "u1", "e1", 49900)).await?;
    let b = store.create(input("r2", "u2", "e1", 25050)).await?;
    store.create(input("r3", "u2", "e1", 10000)).await?;
    store.mark_success(&a, "pay_a").await?;
    store.mark_success(&b, "pay_b").await?;

    assert_eq!(store.count_success("e1").await?, 2);
    assert_eq!(store.total_revenue("e1").await?, Money::from_minor(74950));
    assert_eq!(store.total_revenue_all().await?, Money::from_minor(74950));

    let mine = store.list_by_user("u2").await?;
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|p| p.title == "Rust meetup"));

    let by_event = store.list_by_event("e1").await?;
    assert_eq!(by_event.len(), 3);
    assert!(by_event.iter().any(|p| p.name == "Ada"));

    Ok(())
}
