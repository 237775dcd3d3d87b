use jaguar::adapters::sqlite::create_test_pool;
use jaguar::{SqlEntity, Value};
use sqlx::SqlitePool;

/// Row of the `people` table used across the integration tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Person {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            id: None,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
        }
    }
}

impl SqlEntity for Person {
    const TABLE: &'static str = "people";

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("first_name", self.first_name.clone().into()),
            ("last_name", self.last_name.clone().into()),
        ]
    }
}

/// Create an in-memory SQLite database for testing
///
/// Each call creates a completely isolated database instance with the
/// `people` table in place.
pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool()
        .await
        .expect("failed to create test database");

    sqlx::query(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            first_name TEXT,
            last_name TEXT
        )",
    )
    .execute(&pool)
    .await
    .expect("failed to create people table");

    pool
}

/// Insert the three fixture people and return them with their ids.
#[allow(dead_code)]
pub async fn seed_people(pool: &SqlitePool) -> Vec<Person> {
    sqlx::query_as::<_, Person>(
        "INSERT INTO people (first_name, last_name) VALUES
            ('Marcos', 'Huck'),
            ('Andres', 'Huck'),
            ('Andrew', 'Baker')
         RETURNING *",
    )
    .fetch_all(pool)
    .await
    .expect("failed to seed people")
}

/// Teardown test database
///
/// Closes the connection pool and cleans up resources.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}
