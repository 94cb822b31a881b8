//! A throwaway Postgres schema for tests that need the real queries.
//! Point `TEST_DATABASE_URL` at any database and run `cargo test -- --ignored`.

use diesel_async::{AsyncConnection, AsyncPgConnection, SimpleAsyncConnection};

/// A connection inside a transaction that is never committed, with the
/// migrations applied to a fresh schema and a small fixture loaded:
///
/// - users 1 (`ada`) and 2 (`alan`), course 1
/// - discussion 1 by ada and discussion 2 by alan
/// - comment 1 by alan on discussion 1, comment 2 by ada on discussion 2
pub(crate) async fn connection() -> AsyncPgConnection {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL is not set");
    let mut conn = AsyncPgConnection::establish(&url).await.unwrap();
    conn.begin_test_transaction().await.unwrap();

    conn.batch_execute("CREATE SCHEMA studyhub_test; SET LOCAL search_path TO studyhub_test;")
        .await
        .unwrap();
    conn.batch_execute(include_str!(
        "../migrations/2025-12-01-000000_create_discussions/up.sql"
    ))
    .await
    .unwrap();
    conn.batch_execute(
        "
        INSERT INTO users (id, username, email, full_name) VALUES
            (1, 'ada', 'ada@uni.test', 'Ada Lovelace'),
            (2, 'alan', 'alan@uni.test', 'Alan Turing');
        INSERT INTO courses (id, code, name) VALUES (1, 'CS101', 'Programming 1');
        INSERT INTO discussions (id, title, content, author_id, course_id) VALUES
            (1, 'Exam date', 'When is it?', 1, 1),
            (2, 'Lab rooms', 'Where are they?', 2, 1);
        INSERT INTO comments (id, content, author_id, discussion_id) VALUES
            (1, 'Friday', 2, 1),
            (2, 'Room 4', 1, 2);
        ",
    )
    .await
    .unwrap();

    conn
}
