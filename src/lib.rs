//! LITRevu: ask for reviews of books and articles, review what others asked
//! about, and follow people to see their posts in a feed.

pub mod catchers;
pub mod config;
pub mod db_connection;
pub mod error;
pub mod feed;
pub mod follows;
pub mod media;
pub mod models;
pub mod reviews;
pub mod routes;
pub mod schema;
pub mod tickets;

#[cfg(test)]
mod test_support;

use rocket::fairing::AdHoc;
use rocket::fs::{relative, FileServer, Options};
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

use authrs::environment::Environment;

use crate::config::Config;
use crate::db_connection::init_db_connection_pool;
use crate::error::Result;

/// Assembles the application: database pool, templates, session settings,
/// pages, static files and uploaded media.
pub fn build(config: Config) -> Result<Rocket<Build>> {
    let pool = init_db_connection_pool(&config.database_url)?;
    std::fs::create_dir_all(&config.media_root)?;
    let media = FileServer::new(&config.media_root, Options::Missing);

    Ok(rocket::build()
        .manage(pool)
        .manage(config)
        .attach(Template::fairing())
        .attach(AdHoc::try_on_ignite("Environment", |rocket| async move {
            match Environment::new(&rocket::Config::from(rocket.figment())) {
                Ok(env) => Ok(rocket.manage(env)),
                Err(err) => {
                    tracing::error!("invalid session settings: {}", err);
                    Err(rocket)
                }
            }
        }))
        .mount("/", authrs::routes::routes())
        .mount("/", routes::routes())
        .mount("/static", FileServer::from(relative!("static")))
        .mount("/media", media)
        .register("/", catchers::catchers()))
}
