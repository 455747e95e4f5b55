use creatordesk_worker::infrastructure::persistence::Database;
use uuid::Uuid;

pub async fn setup_test_db() -> Database {
    // File-based SQLite with a unique name per test so tests can run in
    // parallel against isolated databases.
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}
