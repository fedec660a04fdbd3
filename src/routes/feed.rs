use rocket::request::FlashMessage;
use rocket::serde::json::Json;
use rocket::{get, routes, Route};
use rocket_dyn_templates::{context, Template};

use authrs::AuthUser;

use crate::db_connection::DbConn;
use crate::error::Result;
use crate::feed::{feed_for, posts_for, Feed};
use crate::routes::Notice;

pub fn routes() -> Vec<Route> {
    routes![feed, api_feed, posts]
}

#[get("/feed")]
fn feed(user: AuthUser, mut db: DbConn, flash: Option<FlashMessage<'_>>) -> Result<Template> {
    let feed = feed_for(&mut db, user.id)?;
    Ok(Template::render("feed/feed", context! {
        user: &user,
        feed: &feed,
        flash: Notice::from_flash(flash),
    }))
}

#[get("/api/feed")]
fn api_feed(user: AuthUser, mut db: DbConn) -> Result<Json<Feed>> {
    feed_for(&mut db, user.id).map(Json)
}

#[get("/posts")]
fn posts(user: AuthUser, mut db: DbConn, flash: Option<FlashMessage<'_>>) -> Result<Template> {
    let posts = posts_for(&mut db, user.id)?;
    Ok(Template::render("feed/posts", context! {
        user: &user,
        feed: &posts,
        flash: Notice::from_flash(flash),
    }))
}
