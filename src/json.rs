/*!
 * The json module contains all the JSON API stubs for requests and responses,
 * plus the submitted vote form
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dao;

/**
 * A question and its choices, as returned by the management API
 */
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: dao::Question,
    pub choices: Vec<dao::Choice>,
}

/**
 * User-provided details to create a question
 */
#[derive(Debug, Deserialize)]
pub struct QuestionCreateRequest {
    pub text: String,
    /**
     * Defaults to the current time when omitted
     */
    pub pub_date: Option<DateTime<Utc>>,
    /**
     * Just the text of each choice
     */
    pub choices: Vec<String>,
}

/**
 * Partial update for a question, absent fields are left alone
 */
#[derive(Debug, Deserialize)]
pub struct QuestionUpdateRequest {
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
}

/**
 * One row of the management listing
 */
#[derive(Debug, Serialize)]
pub struct QuestionSummary {
    #[serde(flatten)]
    pub question: dao::Question,
    pub was_published_recently: bool,
}

/**
 * A visitor's submitted vote form
 *
 * `choice` is absent when the form was submitted without a selection
 */
#[derive(Debug, Deserialize)]
pub struct Ballot {
    pub choice: Option<i64>,
}
