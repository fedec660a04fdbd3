use chrono::Utc;
use rocket::Either;
use rocket::form::{self, Contextual, Form};
use rocket::response::{Flash, Redirect};
use rocket::{get, post, routes, FromForm, Route};
use rocket_dyn_templates::{context, Template};

use authrs::AuthUser;

use crate::db_connection::DbConn;
use crate::error::{Error, Result};
use crate::follows::find_member;
use crate::models::{ReviewChanges, Ticket};
use crate::reviews::{
    create_review, delete_review, owned_review, reviewable_ticket, update_review, ReviewDraft,
};
use crate::routes::char_len;

#[derive(Debug, FromForm)]
pub struct ReviewForm<'r> {
    #[field(validate = range(0..=5))]
    pub rating: i16,
    #[field(validate = char_len(1, 128))]
    pub headline: &'r str,
    #[field(validate = char_len(0, 8192))]
    #[field(default = "")]
    pub body: &'r str,
}

impl<'r> ReviewForm<'r> {
    pub fn draft(&self) -> ReviewDraft<'r> {
        ReviewDraft { rating: self.rating, headline: self.headline, body: self.body }
    }
}

pub fn routes() -> Vec<Route> {
    routes![create_page, create, update_page, update, delete_page, delete]
}

type Page = Either<Flash<Redirect>, Template>;

fn back_to_feed(message: &'static str) -> Page {
    Either::Left(Flash::error(Redirect::to("/feed"), message))
}

fn ticket_author(db: &mut DbConn, ticket: &Ticket) -> Result<String> {
    Ok(find_member(db, ticket.user_id)?.username)
}

#[get("/reviews/create/<ticket_id>", rank = 2)]
fn create_page(user: AuthUser, mut db: DbConn, ticket_id: i32) -> Result<Page> {
    let ticket = match reviewable_ticket(&mut db, ticket_id, user.id) {
        Ok(ticket) => ticket,
        Err(Error::Invalid(message)) => return Ok(back_to_feed(message)),
        Err(err) => return Err(err),
    };

    Ok(Either::Right(Template::render("feed/review_create", context! {
        user: &user,
        ticket_author: ticket_author(&mut db, &ticket)?,
        ticket: &ticket,
        form: &form::Context::default(),
    })))
}

#[post("/reviews/create/<ticket_id>", data = "<form>", rank = 2)]
fn create<'r>(
    user: AuthUser,
    mut db: DbConn,
    ticket_id: i32,
    form: Form<Contextual<'r, ReviewForm<'r>>>,
) -> Result<Page> {
    let ticket = match reviewable_ticket(&mut db, ticket_id, user.id) {
        Ok(ticket) => ticket,
        Err(Error::Invalid(message)) => return Ok(back_to_feed(message)),
        Err(err) => return Err(err),
    };

    if let Some(ref fields) = form.value {
        let now = Utc::now().naive_utc();
        return match create_review(&mut db, ticket_id, user.id, &fields.draft(), now) {
            Ok(_) => Ok(Either::Left(Flash::success(Redirect::to("/feed"), "Review published."))),
            Err(Error::Invalid(message)) => Ok(back_to_feed(message)),
            Err(err) => Err(err),
        };
    }

    Ok(Either::Right(Template::render("feed/review_create", context! {
        user: &user,
        ticket_author: ticket_author(&mut db, &ticket)?,
        ticket: &ticket,
        form: &form.context,
    })))
}

#[get("/reviews/<id>/update")]
fn update_page(user: AuthUser, mut db: DbConn, id: i32) -> Result<Template> {
    let (review, ticket) = owned_review(&mut db, id, user.id)?;
    Ok(Template::render("feed/review_update", context! {
        user: &user,
        ticket_author: ticket_author(&mut db, &ticket)?,
        ticket: &ticket,
        review: &review,
        form: &form::Context::default(),
    }))
}

#[post("/reviews/<id>/update", data = "<form>")]
fn update<'r>(
    user: AuthUser,
    mut db: DbConn,
    id: i32,
    form: Form<Contextual<'r, ReviewForm<'r>>>,
) -> Result<Page> {
    let (review, ticket) = owned_review(&mut db, id, user.id)?;

    if let Some(ref fields) = form.value {
        let changes = ReviewChanges {
            rating: fields.rating,
            headline: fields.headline,
            body: fields.body,
        };
        update_review(&mut db, id, user.id, &changes)?;
        return Ok(Either::Left(Flash::success(Redirect::to("/posts"), "Review updated.")));
    }

    Ok(Either::Right(Template::render("feed/review_update", context! {
        user: &user,
        ticket_author: ticket_author(&mut db, &ticket)?,
        ticket: &ticket,
        review: &review,
        form: &form.context,
    })))
}

#[get("/reviews/<id>/delete")]
fn delete_page(user: AuthUser, mut db: DbConn, id: i32) -> Result<Template> {
    let (review, ticket) = owned_review(&mut db, id, user.id)?;
    Ok(Template::render("feed/review_delete", context! {
        user: &user,
        ticket: &ticket,
        review: &review,
    }))
}

#[post("/reviews/<id>/delete")]
fn delete(user: AuthUser, mut db: DbConn, id: i32) -> Result<Flash<Redirect>> {
    delete_review(&mut db, id, user.id)?;
    Ok(Flash::success(Redirect::to("/posts"), "Review deleted."))
}
