use dotenv::dotenv;
use log::*;

use std::env;

use ballotbox::{app, db, load_templates, AppState};

#[async_std::main]
async fn main() -> Result<(), std::io::Error> {
    pretty_env_logger::init();
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let listen = env::var("HTTP_LISTEN").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let templates_dir = env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());

    let templates = match load_templates(&templates_dir) {
        Ok(templates) => templates,
        Err(err) => {
            error!("Could not load templates from {}! {}", templates_dir, err);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, err));
        }
    };

    match db::create_pool(&database_url).await {
        Ok(pool) => {
            if let Err(err) = db::migrate(&pool).await {
                error!("Could not migrate the database! {:?}", err);
                return Err(std::io::Error::new(std::io::ErrorKind::Other, err));
            }

            let app = app(AppState::new(pool, templates));
            info!("Listening on {}", listen);
            app.listen(listen).await?;
            Ok(())
        }
        Err(err) => {
            error!("Could not initialize pool! {:?}", err);
            Err(std::io::Error::new(std::io::ErrorKind::Other, err))
        }
    }
}
