use std::sync::Arc;

use handlebars::Handlebars;
use sqlx::SqlitePool;

pub mod dao;
pub mod db;
pub mod json;
pub mod routes;

/**
 * Struct for carrying application state into tide request handlers
 */
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub templates: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(db: SqlitePool, templates: Handlebars<'static>) -> Self {
        Self {
            db,
            templates: Arc::new(templates),
        }
    }
}

/**
 * Load every .hbs file under the given directory into a handlebars registry
 *
 * Template names mirror their relative paths, e.g. templates/polls/index.hbs
 * registers as `polls/index`
 */
pub fn load_templates(dir: &str) -> Result<Handlebars<'static>, handlebars::TemplateFileError> {
    let mut templates = Handlebars::new();
    templates.register_templates_directory(".hbs", dir)?;
    Ok(templates)
}

/**
 * Construct the tide application with all the routes mounted
 */
pub fn app(state: AppState) -> tide::Server<AppState> {
    let mut app = tide::with_state(state);
    app.with(driftwood::DevLogger);

    app.at("/").get(routes::index);

    app.at("/polls").get(routes::polls::index);
    app.at("/polls/:question_id").get(routes::polls::detail);
    app.at("/polls/:question_id/results").get(routes::polls::results);
    app.at("/polls/:question_id/vote").post(routes::polls::vote);

    app.at("/members").get(routes::members::index);

    app.at("/api/v1/questions")
        .get(routes::api::list)
        .put(routes::api::create);
    app.at("/api/v1/questions/:question_id")
        .post(routes::api::update)
        .delete(routes::api::delete);

    app
}
