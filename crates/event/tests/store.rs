use eventdesk_event::{EventPatch, Store};
use eventdesk_shared::{Error, Money};
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn test_create_and_find() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let mut input = helpers::event_input("Rust meetup", "2099-05-01", 30);
    input.is_paid = true;
    input.price = "499.00".parse()?;
    input.registration_deadline = Some("2099-04-30".to_owned());

    let id = store.create(input, "admin").await?;
    let event = store.find(&id).await?.unwrap();

    assert_eq!(event.title, "Rust meetup");
    assert_eq!(event.price, Money::from_minor(49900));
    assert!(event.is_paid);
    assert_eq!(event.current_participants, 0);
    assert_eq!(event.available_seats(), 30);
    assert_eq!(event.created_by, "admin");
    assert!(store.find("missing").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_listings_are_ordered_and_filtered() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    store
        .create(helpers::event_input("Later", "2099-06-01", 10), "admin")
        .await?;
    store
        .create(helpers::event_input("Sooner", "2099-01-01", 10), "admin")
        .await?;
    store
        .create(helpers::event_input("Past", "2001-01-01", 10), "admin")
        .await?;

    let mut music = helpers::event_input("Jazz night", "2099-03-01", 10);
    music.category = "music".to_owned();
    store.create(music, "admin").await?;

    let titles = |events: Vec<eventdesk_event::Event>| {
        events.into_iter().map(|e| e.title).collect::<Vec<_>>()
    };

    assert_eq!(
        titles(store.list_all().await?),
        vec!["Past", "Sooner", "Jazz night", "Later"]
    );
    assert_eq!(
        titles(store.list_upcoming().await?),
        vec!["Sooner", "Jazz night", "Later"]
    );
    assert_eq!(titles(store.list_by_category("music").await?), vec!["Jazz night"]);
    assert_eq!(titles(store.search("JAZZ").await?), vec!["Jazz night"]);
    assert_eq!(store.search("  ").await?.len(), 3);
    assert_eq!(store.count().await?, 4);
    assert_eq!(store.count_upcoming().await?, 3);

    Ok(())
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    for title in ["Jazz night", "100% Rust", "snake_case talk", "Paths with \\ in them"] {
        store
            .create(helpers::event_input(title, "2099-03-01", 10), "admin")
            .await?;
    }

    let titles = |events: Vec<eventdesk_event::Event>| {
        events.into_iter().map(|e| e.title).collect::<Vec<_>>()
    };

    assert_eq!(titles(store.search("%").await?), vec!["100% Rust"]);
    assert_eq!(titles(store.search("_").await?), vec!["snake_case talk"]);
    assert_eq!(titles(store.search("\\").await?), vec!["Paths with \\ in them"]);
    assert!(store.search("jazz%night").await?.is_empty());
    assert_eq!(titles(store.search("0% r").await?), vec!["100% Rust"]);

    Ok(())
}

#[tokio::test]
async fn test_participant_counter_is_guarded() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let id = store
        .create(helpers::event_input("Tiny", "2099-05-01", 2), "admin")
        .await?;

    assert_eq!(store.decrement_participants(&id).await?, 0);
    assert_eq!(store.increment_participants(&id).await?, 1);
    assert_eq!(store.increment_participants(&id).await?, 1);
    assert_eq!(store.increment_participants(&id).await?, 0);
    assert!(store.is_full(&id).await?);
    assert_eq!(store.available_seats(&id).await?, 0);

    assert_eq!(store.decrement_participants(&id).await?, 1);
    assert!(!store.is_full(&id).await?);
    assert_eq!(store.available_seats(&id).await?, 1);

    assert_eq!(store.increment_participants("missing").await?, 0);
    assert!(store.is_full("missing").await?);
    assert_eq!(store.available_seats("missing").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_update_applies_only_given_fields() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let id = store
        .create(helpers::event_input("Workshop", "2099-05-01", 5), "admin")
        .await?;

    let affected = store
        .update(
            &id,
            EventPatch {
                venue: Some("Room 4".to_owned()),
                registration_deadline: Some("2099-04-20".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(affected, 1);

    let event = store.find(&id).await?.unwrap();
    assert_eq!(event.venue, "Room 4");
    assert_eq!(event.title, "Workshop");
    assert!(event.registration_deadline.is_some());

    assert_eq!(store.update(&id, EventPatch::default()).await?, 0);
    assert_eq!(
        store
            .update(
                "missing",
                EventPatch {
                    title: Some("x".to_owned()),
                    ..Default::default()
                }
            )
            .await?,
        0
    );

    Ok(())
}

#[tokio::test]
async fn test_update_cannot_drop_capacity_below_participants() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let id = store
        .create(helpers::event_input("Workshop", "2099-05-01", 5), "admin")
        .await?;
    store.increment_participants(&id).await?;
    store.increment_participants(&id).await?;

    let err = store
        .update(
            &id,
            EventPatch {
                max_participants: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));

    let affected = store
        .update(
            &id,
            EventPatch {
                max_participants: Some(2),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(affected, 1);
    assert!(store.is_full(&id).await?);

    let err = store
        .update(
            &id,
            EventPatch {
                is_paid: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));

    store.delete(&id).await?;
    let affected = store
        .update(
            &id,
            EventPatch {
                max_participants: Some(1),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(affected, 0);

    Ok(())
}

#[tokio::test]
async fn test_delete() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let store = Store::new(state);

    let id = store
        .create(helpers::event_input("Gone", "2099-05-01", 5), "admin")
        .await?;

    assert_eq!(store.delete(&id).await?, 1);
    assert_eq!(store.delete(&id).await?, 0);
    assert!(store.find(&id).await?.is_none());

    Ok(())
}
