use std::str::FromStr;

use log::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/**
 * Construct the SQLite connection pool
 *
 * The database file is created on first run
 */
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/*
 * The schema is small enough that versioned migrations would be overhead,
 * every statement is re-runnable
 */
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        pub_date TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS choices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        question_id INTEGER NOT NULL REFERENCES questions(id),
        text TEXT NOT NULL,
        votes INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS people (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS \"groups\" (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS memberships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        person_id INTEGER NOT NULL REFERENCES people(id),
        group_id INTEGER NOT NULL REFERENCES \"groups\"(id)
    )",
];

/**
 * Bring the schema up to date, creating any table that does not exist yet
 */
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("Schema is up to date");
    Ok(())
}
