mod common;

use common::{count_rows, create_private_room, create_test_user, message, setup_test_db};
use parley_server::store::{Page, Store, StoreError};

async fn two_users(pool: &sqlx::SqlitePool) -> (i64, i64) {
    let (alice, _) = create_test_user(pool, "alice@test.com", "alice").await;
    let (bob, _) = create_test_user(pool, "bob@test.com", "bob").await;
    (alice, bob)
}

fn texts(messages: &[parley_server::models::ChatMessage]) -> Vec<String> {
    messages.iter().map(|m| m.text.clone()).collect()
}

#[tokio::test]
async fn private_chatroom_is_created_with_first_message() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;

    let (chatroom, first) = store
        .create_private_chatroom(alice, bob, &message(alice, "hi bob"))
        .await
        .unwrap();

    assert!(!chatroom.is_group);
    assert_eq!(chatroom.participants.len(), 2);
    assert_eq!(first.chatroom_id, chatroom.id);
    assert_eq!(first.sender_id, alice);
    assert!(first.id > 0);
    assert!(!first.timestamp.is_empty());
    assert_eq!(chatroom.messages, vec![first]);
}

#[tokio::test]
async fn private_chatroom_creation_is_all_or_nothing() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, _) = create_test_user(&pool, "alice@test.com", "alice").await;

    // User 9999 does not exist, so the participant insert fails.
    let result = store
        .create_private_chatroom(alice, 9999, &message(alice, "hello?"))
        .await;

    assert!(matches!(result, Err(StoreError::Persistence(_))));
    assert_eq!(count_rows(&pool, "chatrooms").await, 0);
    assert_eq!(count_rows(&pool, "chatroom_participants").await, 0);
    assert_eq!(count_rows(&pool, "messages").await, 0);
}

#[tokio::test]
async fn private_chatroom_with_participant_zero_leaves_nothing_behind() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, _) = create_test_user(&pool, "alice@test.com", "alice").await;

    let result = store
        .create_private_chatroom(alice, 0, &message(alice, "hello?"))
        .await;

    assert!(result.is_err());
    assert_eq!(count_rows(&pool, "chatrooms").await, 0);
    assert_eq!(count_rows(&pool, "chatroom_participants").await, 0);
    assert_eq!(count_rows(&pool, "messages").await, 0);
}

#[tokio::test]
async fn messages_page_from_newest_and_read_oldest_first() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let room = create_private_room(&pool, alice, bob, "m1").await;
    for i in 2..=25 {
        store
            .add_message(room, &message(alice, &format!("m{}", i)))
            .await
            .unwrap();
    }

    let first = store
        .messages_by_chatroom(room, Page::new(Some(1), Some(10)))
        .await
        .unwrap();
    let expected: Vec<String> = (16..=25).map(|i| format!("m{}", i)).collect();
    assert_eq!(texts(&first), expected);

    let second = store
        .messages_by_chatroom(room, Page::new(Some(2), Some(10)))
        .await
        .unwrap();
    let expected: Vec<String> = (6..=15).map(|i| format!("m{}", i)).collect();
    assert_eq!(texts(&second), expected);

    let last = store
        .messages_by_chatroom(room, Page::new(Some(3), Some(10)))
        .await
        .unwrap();
    let expected: Vec<String> = (1..=5).map(|i| format!("m{}", i)).collect();
    assert_eq!(texts(&last), expected);

    let beyond = store
        .messages_by_chatroom(room, Page::new(Some(4), Some(10)))
        .await
        .unwrap();
    assert!(beyond.is_empty());
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_window() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let room = create_private_room(&pool, alice, bob, "only").await;

    let page = store
        .messages_by_chatroom(room, Page::new(Some(i64::MAX), Some(20)))
        .await
        .unwrap();
    assert!(page.is_empty());

    let wide = store
        .messages_by_chatroom(room, Page::new(Some(1), Some(i64::MAX)))
        .await
        .unwrap();
    assert_eq!(texts(&wide), vec!["only".to_string()]);
}

#[tokio::test]
async fn invalid_paging_falls_back_to_defaults() {
    let page = Page::new(Some(0), Some(-3));
    assert_eq!(page, Page::first());
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 20);
    assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
}

#[tokio::test]
async fn unread_count_ignores_own_and_viewed_messages() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let room = create_private_room(&pool, alice, bob, "one").await;

    let mut sent = Vec::new();
    for text in ["two", "three", "four", "five"] {
        sent.push(store.add_message(room, &message(alice, text)).await.unwrap());
    }

    assert_eq!(store.unread_count(room, bob).await.unwrap(), 5);
    assert_eq!(store.unread_count(room, alice).await.unwrap(), 0);

    store.mark_viewed(sent[0].id).await.unwrap();
    store.mark_viewed(sent[1].id).await.unwrap();

    assert_eq!(store.unread_count(room, bob).await.unwrap(), 3);
}

#[tokio::test]
async fn unread_counts_are_per_reader_in_chatroom_listings() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let room = create_private_room(&pool, alice, bob, "a1").await;
    for i in 2..=5 {
        store.add_message(room, &message(alice, &format!("a{}", i))).await.unwrap();
    }
    for i in 1..=3 {
        store.add_message(room, &message(bob, &format!("b{}", i))).await.unwrap();
    }

    let for_bob = store.chatrooms_by_user(bob, Page::first()).await.unwrap();
    let for_alice = store.chatrooms_by_user(alice, Page::first()).await.unwrap();

    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].unread_count, 5);
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0].unread_count, 3);
}

#[tokio::test]
async fn mark_viewed_is_idempotent_and_reports_missing() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let room = create_private_room(&pool, alice, bob, "first").await;
    let sent = store.add_message(room, &message(bob, "reply")).await.unwrap();

    let once = store.mark_viewed(sent.id).await.unwrap();
    let twice = store.mark_viewed(sent.id).await.unwrap();
    assert!(once.viewed);
    assert_eq!(once, twice);

    let missing = store.mark_viewed(4242).await;
    assert!(matches!(
        missing,
        Err(StoreError::NotFound { entity: "message", id: 4242 })
    ));
}

#[tokio::test]
async fn add_message_to_missing_chatroom_is_not_found() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, _) = create_test_user(&pool, "alice@test.com", "alice").await;

    let result = store.add_message(77, &message(alice, "anyone?")).await;

    assert!(matches!(
        result,
        Err(StoreError::NotFound { entity: "chatroom", id: 77 })
    ));
    assert_eq!(count_rows(&pool, "messages").await, 0);
}

#[tokio::test]
async fn group_update_renames_and_only_adds_participants() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let (carol, _) = create_test_user(&pool, "carol@test.com", "carol").await;

    let group = store
        .create_group_chatroom("  Weekend  ", &[alice, bob, bob])
        .await
        .unwrap();
    assert!(group.is_group);
    assert_eq!(group.group_name.as_deref(), Some("Weekend"));
    assert_eq!(group.participants.len(), 2);

    let renamed = store
        .update_group_chatroom(group.id, "Hiking", &[carol, alice])
        .await
        .unwrap();
    assert_eq!(renamed.group_name.as_deref(), Some("Hiking"));
    let ids: Vec<i64> = renamed.participants.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![alice, bob, carol]);

    // Blank name keeps the current one.
    let same = store.update_group_chatroom(group.id, " ", &[]).await.unwrap();
    assert_eq!(same.group_name.as_deref(), Some("Hiking"));
}

#[tokio::test]
async fn group_update_rejects_private_rooms() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let room = create_private_room(&pool, alice, bob, "hey").await;

    let result = store.update_group_chatroom(room, "Nope", &[]).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn chatroom_views_are_personalized() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, bob) = two_users(&pool).await;
    let (carol, _) = create_test_user(&pool, "carol@test.com", "carol").await;
    let room = create_private_room(&pool, alice, bob, "hey").await;

    let for_alice = store.chatrooms_by_user(alice, Page::first()).await.unwrap();
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0].chatroom_name, "bob");
    assert_eq!(for_alice[0].unread_count, 0);

    let for_bob = store.chatroom_for_user(room, bob, Page::first()).await.unwrap().unwrap();
    assert_eq!(for_bob.chatroom_name, "alice");
    assert_eq!(for_bob.unread_count, 1);
    assert_eq!(for_bob.chatroom.messages.len(), 1);

    assert!(store.chatroom_for_user(room, carol, Page::first()).await.unwrap().is_none());
    assert!(store.chatrooms_by_user(carol, Page::first()).await.unwrap().is_empty());
    assert!(!store.is_participant(room, carol).await.unwrap());
}

#[tokio::test]
async fn sessions_resolve_until_they_expire() {
    let pool = setup_test_db().await;
    let store = Store::new(pool.clone());
    let (alice, token) = create_test_user(&pool, "alice@test.com", "alice").await;

    let user = store.resolve_session(&token).await.unwrap().unwrap();
    assert_eq!(user.id, alice);
    assert_eq!(user.nickname, "alice");

    let expired_at = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ('old', ?, ?)")
        .bind(alice)
        .bind(&expired_at)
        .execute(&pool)
        .await
        .unwrap();

    assert!(store.resolve_session("old").await.unwrap().is_none());
    assert!(store.resolve_session("unknown").await.unwrap().is_none());
    assert!(store.resolve_session("").await.unwrap().is_none());
}
