use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory SQLite database with the schema synced from the entity
/// registry. Capped to one connection: every pooled connection to
/// `sqlite::memory:` sees its own empty database.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect to sqlite");
    db.get_schema_registry("wishlists::db::entities::*")
        .sync(&db)
        .await
        .expect("sync schema");
    db
}
