#![allow(dead_code)]

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tide::http::{Method, Request, Response, Url};

use ballotbox::{app, db, load_templates, AppState};

/**
 * A fully-migrated application backed by a private in-memory database
 *
 * The pool is capped at one connection so that every query sees the same
 * in-memory database
 */
pub async fn test_app() -> (tide::Server<AppState>, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::migrate(&pool).await.expect("migrations");

    let templates = load_templates("templates").expect("template registry");
    let server = app(AppState::new(pool.clone(), templates));
    (server, pool)
}

/**
 * Insert a question published `days` from now (negative for the past)
 */
pub async fn create_question(pool: &SqlitePool, text: &str, days: i64) -> i64 {
    let pub_date = Utc::now() + Duration::days(days);
    sqlx::query("INSERT INTO questions (text, pub_date) VALUES (?, ?)")
        .bind(text)
        .bind(pub_date)
        .execute(pool)
        .await
        .expect("insert question")
        .last_insert_rowid()
}

pub async fn create_choice(pool: &SqlitePool, question_id: i64, text: &str) -> i64 {
    sqlx::query("INSERT INTO choices (question_id, text, votes) VALUES (?, ?, 0)")
        .bind(question_id)
        .bind(text)
        .execute(pool)
        .await
        .expect("insert choice")
        .last_insert_rowid()
}

pub async fn create_person(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO people (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .expect("insert person")
        .last_insert_rowid()
}

pub async fn create_group(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO \"groups\" (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .expect("insert group")
        .last_insert_rowid()
}

pub async fn create_membership(pool: &SqlitePool, person_id: i64, group_id: i64) -> i64 {
    sqlx::query("INSERT INTO memberships (person_id, group_id) VALUES (?, ?)")
        .bind(person_id)
        .bind(group_id)
        .execute(pool)
        .await
        .expect("insert membership")
        .last_insert_rowid()
}

pub async fn votes_for(pool: &SqlitePool, choice_id: i64) -> i64 {
    let (votes,): (i64,) = sqlx::query_as("SELECT votes FROM choices WHERE id = ?")
        .bind(choice_id)
        .fetch_one(pool)
        .await
        .expect("choice tally");
    votes
}

fn url(path: &str) -> Url {
    Url::parse(&format!("http://polls.test{}", path)).expect("test url")
}

pub async fn get(server: &tide::Server<AppState>, path: &str) -> Response {
    let request = Request::new(Method::Get, url(path));
    server.respond(request).await.expect("response")
}

pub async fn post_form(server: &tide::Server<AppState>, path: &str, body: &str) -> Response {
    let mut request = Request::new(Method::Post, url(path));
    request.set_body(body);
    request.set_content_type(tide::http::mime::FORM);
    server.respond(request).await.expect("response")
}

pub async fn send(server: &tide::Server<AppState>, method: Method, path: &str) -> Response {
    let request = Request::new(method, url(path));
    server.respond(request).await.expect("response")
}

pub async fn send_json(
    server: &tide::Server<AppState>,
    method: Method,
    path: &str,
    body: &serde_json::Value,
) -> Response {
    let mut request = Request::new(method, url(path));
    request.set_body(tide::http::Body::from_json(body).expect("json body"));
    server.respond(request).await.expect("response")
}
