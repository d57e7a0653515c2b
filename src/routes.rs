/*!
 * The routes module contains all the tide routes and the logic to fulfill the
 * responses for each route.
 *
 * Modules are nested for cleaner organization here
 */
use tide::{Redirect, Request, Response, StatusCode};

use crate::AppState;

/**
 *  GET /
 */
pub async fn index(_req: Request<AppState>) -> tide::Result {
    Ok(Redirect::new("/polls").into())
}

/**
 * Pull the `question_id` parameter out of the request path
 */
fn question_id(req: &Request<AppState>) -> tide::Result<i64> {
    req.param::<i64>("question_id")
        .map_err(|_| tide::Error::from_str(StatusCode::BadRequest, "Invalid question id"))
}

/**
 * Render the named template with the given context as an HTML response
 */
fn render(state: &AppState, name: &str, context: &serde_json::Value) -> tide::Result<Response> {
    let body = state
        .templates
        .render(name, context)
        .map_err(|err| tide::Error::from_str(StatusCode::InternalServerError, err))?;

    Ok(Response::builder(StatusCode::Ok)
        .content_type(tide::http::mime::HTML)
        .body(body)
        .build())
}

/**
 * An HTML not-found page, escaping the message before interpolation
 */
fn not_found(message: &str) -> Response {
    let body = format!(
        "<h1>Not Found</h1>\n<p>{}</p>\n",
        html_escape::encode_text(message)
    );

    Response::builder(StatusCode::NotFound)
        .content_type(tide::http::mime::HTML)
        .body(body)
        .build()
}

pub mod polls {
    use chrono::Utc;
    use log::*;
    use sqlx::SqlitePool;
    use tide::{Redirect, Request};

    use crate::dao::{Choice, Question};
    use crate::json::Ballot;
    use crate::AppState;

    use super::{not_found, question_id, render};

    /**
     * Look up a question visitors are allowed to see
     *
     * Future-dated questions are treated as nonexistent
     */
    async fn published_question(db: &SqlitePool, id: i64) -> tide::Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, text, pub_date FROM questions WHERE id = ? AND pub_date <= ?",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(db)
        .await?;

        Ok(question)
    }

    async fn choices_for(db: &SqlitePool, question: &Question) -> tide::Result<Vec<Choice>> {
        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, text, votes FROM choices WHERE question_id = ? ORDER BY id ASC",
        )
        .bind(question.id)
        .fetch_all(db)
        .await?;

        Ok(choices)
    }

    /**
     *  GET /polls
     */
    pub async fn index(req: Request<AppState>) -> tide::Result {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, text, pub_date FROM questions WHERE pub_date <= ? ORDER BY pub_date DESC",
        )
        .bind(Utc::now())
        .fetch_all(&req.state().db)
        .await?;

        debug!("Listing {} published questions", questions.len());

        render(
            req.state(),
            "polls/index",
            &serde_json::json!({ "questions": questions }),
        )
    }

    /**
     *  GET /polls/:question_id
     */
    pub async fn detail(req: Request<AppState>) -> tide::Result {
        let id = question_id(&req)?;

        match published_question(&req.state().db, id).await? {
            Some(question) => {
                let choices = choices_for(&req.state().db, &question).await?;
                render(
                    req.state(),
                    "polls/detail",
                    &serde_json::json!({ "question": question, "choices": choices }),
                )
            }
            None => {
                debug!("No published question with id {}", id);
                Ok(not_found("That poll does not exist"))
            }
        }
    }

    /**
     *  GET /polls/:question_id/results
     */
    pub async fn results(req: Request<AppState>) -> tide::Result {
        let id = question_id(&req)?;

        match published_question(&req.state().db, id).await? {
            Some(question) => {
                let choices = choices_for(&req.state().db, &question).await?;
                render(
                    req.state(),
                    "polls/results",
                    &serde_json::json!({ "question": question, "choices": choices }),
                )
            }
            None => Ok(not_found("That poll does not exist")),
        }
    }

    /**
     *  POST /polls/:question_id/vote
     */
    pub async fn vote(mut req: Request<AppState>) -> tide::Result {
        let id = question_id(&req)?;
        let body = req.body_string().await?;
        let ballot: Ballot = serde_qs::from_str(&body).unwrap_or(Ballot { choice: None });

        let question = match published_question(&req.state().db, id).await? {
            Some(question) => question,
            None => return Ok(not_found("That poll does not exist")),
        };

        let choice_id = match ballot.choice {
            Some(choice_id) => choice_id,
            None => {
                info!("Empty ballot for question {}", question.id);
                return voting_error(&req, question).await;
            }
        };

        let updated =
            sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = ? AND question_id = ?")
                .bind(choice_id)
                .bind(question.id)
                .execute(&req.state().db)
                .await?;

        if updated.rows_affected() == 0 {
            warn!(
                "Ballot for question {} named unknown choice {}",
                question.id, choice_id
            );
            return voting_error(&req, question).await;
        }

        debug!("Vote recorded for choice {}", choice_id);
        Ok(Redirect::new(format!("/polls/{}/results", question.id)).into())
    }

    /**
     * Re-render the detail page with the voting error, leaving tallies alone
     */
    async fn voting_error(req: &Request<AppState>, question: Question) -> tide::Result {
        let choices = choices_for(&req.state().db, &question).await?;

        render(
            req.state(),
            "polls/detail",
            &serde_json::json!({
                "question": question,
                "choices": choices,
                "error_message": "You forgot to select anything you idiot",
            }),
        )
    }
}

pub mod members {
    use tide::Request;

    use crate::dao::{Group, MembershipRow, Person};
    use crate::AppState;

    use super::render;

    /**
     *  GET /members
     */
    pub async fn index(req: Request<AppState>) -> tide::Result {
        let db = &req.state().db;

        let people = sqlx::query_as::<_, Person>("SELECT id, name FROM people ORDER BY id ASC")
            .fetch_all(db)
            .await?;

        let groups =
            sqlx::query_as::<_, Group>("SELECT id, name FROM \"groups\" ORDER BY id ASC")
                .fetch_all(db)
                .await?;

        let memberships = sqlx::query_as::<_, MembershipRow>(
            "SELECT m.id AS id, p.name AS person_name, g.name AS group_name
             FROM memberships m
             JOIN people p ON p.id = m.person_id
             JOIN \"groups\" g ON g.id = m.group_id
             ORDER BY m.id ASC",
        )
        .fetch_all(db)
        .await?;

        render(
            req.state(),
            "members/index",
            &serde_json::json!({
                "people": people,
                "groups": groups,
                "memberships": memberships,
            }),
        )
    }
}

pub mod api {
    use chrono::Utc;
    use log::*;
    use tide::{Body, Request, Response, StatusCode};

    use crate::dao::{Choice, Question};
    use crate::json;
    use crate::AppState;

    use super::question_id;

    /**
     *  GET /api/v1/questions
     */
    pub async fn list(req: Request<AppState>) -> tide::Result {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, text, pub_date FROM questions ORDER BY pub_date DESC",
        )
        .fetch_all(&req.state().db)
        .await?;

        let listing: Vec<json::QuestionSummary> = questions
            .into_iter()
            .map(|question| json::QuestionSummary {
                was_published_recently: question.was_published_recently(),
                question,
            })
            .collect();

        Ok(Response::builder(StatusCode::Ok)
            .body(Body::from_json(&listing)?)
            .build())
    }

    /**
     *  PUT /api/v1/questions
     */
    pub async fn create(mut req: Request<AppState>) -> tide::Result {
        let request: json::QuestionCreateRequest = req.body_json().await?;
        let pub_date = request.pub_date.unwrap_or_else(Utc::now);

        let mut tx = req.state().db.begin().await?;

        let inserted = sqlx::query("INSERT INTO questions (text, pub_date) VALUES (?, ?)")
            .bind(&request.text)
            .bind(pub_date)
            .execute(&mut tx)
            .await?;
        let question_id = inserted.last_insert_rowid();

        for choice in request.choices.iter() {
            sqlx::query("INSERT INTO choices (question_id, text, votes) VALUES (?, ?, 0)")
                .bind(question_id)
                .bind(choice)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;
        info!(
            "Created question {} with {} choices",
            question_id,
            request.choices.len()
        );

        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, text, votes FROM choices WHERE question_id = ? ORDER BY id ASC",
        )
        .bind(question_id)
        .fetch_all(&req.state().db)
        .await?;

        let response = json::QuestionResponse {
            question: Question {
                id: question_id,
                text: request.text,
                pub_date,
            },
            choices,
        };

        Ok(Response::builder(StatusCode::Created)
            .body(Body::from_json(&response)?)
            .build())
    }

    /**
     *  POST /api/v1/questions/:question_id
     */
    pub async fn update(mut req: Request<AppState>) -> tide::Result {
        let id = question_id(&req)?;
        let request: json::QuestionUpdateRequest = req.body_json().await?;

        let existing = sqlx::query_as::<_, Question>(
            "SELECT id, text, pub_date FROM questions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&req.state().db)
        .await?;

        let existing = match existing {
            Some(question) => question,
            None => return Err(tide::Error::from_str(StatusCode::NotFound, "No such question")),
        };

        let text = request.text.unwrap_or(existing.text);
        let pub_date = request.pub_date.unwrap_or(existing.pub_date);

        sqlx::query("UPDATE questions SET text = ?, pub_date = ? WHERE id = ?")
            .bind(&text)
            .bind(pub_date)
            .bind(id)
            .execute(&req.state().db)
            .await?;

        let question = Question { id, text, pub_date };
        Ok(Response::builder(StatusCode::Ok)
            .body(Body::from_json(&question)?)
            .build())
    }

    /**
     *  DELETE /api/v1/questions/:question_id
     */
    pub async fn delete(req: Request<AppState>) -> tide::Result {
        let id = question_id(&req)?;

        let mut tx = req.state().db.begin().await?;
        sqlx::query("DELETE FROM choices WHERE question_id = ?")
            .bind(id)
            .execute(&mut tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&mut tx)
            .await?;
        tx.commit().await?;

        if deleted.rows_affected() == 0 {
            return Err(tide::Error::from_str(StatusCode::NotFound, "No such question"));
        }

        info!("Deleted question {}", id);
        Ok(Response::builder(StatusCode::NoContent).build())
    }
}
