use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Open (creating if absent) the sqlite database at `database_url` and run
/// pending migrations. One pool is shared across the process; individual
/// writer discipline (§5 "the DB session is never shared across threads")
/// is enforced by the Crawl Engine serializing commits through a single
/// task, not by the pool itself.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
