use chrono::Utc;
use rocket::Either;
use rocket::form::{self, Contextual, Form};
use rocket::fs::TempFile;
use rocket::response::{Flash, Redirect};
use rocket::{get, post, routes, FromForm, Route, State};
use rocket_dyn_templates::{context, Template};
use std::path::Path;

use authrs::AuthUser;

use crate::config::Config;
use crate::db_connection::DbConn;
use crate::error::{Error, Result};
use crate::media::{remove_image, remove_unless_saved, store_image};
use crate::models::TicketChanges;
use crate::routes::reviews::ReviewForm;
use crate::routes::char_len;
use crate::tickets::{
    create_ticket, create_ticket_with_review, delete_ticket, owned_ticket, update_ticket,
    TicketDraft,
};

#[derive(Debug, FromForm)]
pub struct TicketForm<'r> {
    #[field(validate = char_len(1, 128))]
    pub title: &'r str,
    #[field(validate = char_len(0, 2048))]
    #[field(default = "")]
    pub description: &'r str,
    pub image: Option<TempFile<'r>>,
    /// Only meaningful when editing.
    pub clear_image: bool,
}

#[derive(Debug, FromForm)]
pub struct TicketReviewForm<'r> {
    pub ticket: TicketForm<'r>,
    pub review: ReviewForm<'r>,
}

pub fn routes() -> Vec<Route> {
    routes![
        create_page,
        create,
        create_with_review_page,
        create_with_review,
        update_page,
        update,
        delete_page,
        delete,
    ]
}

type Page = Either<Flash<Redirect>, Template>;

fn to_posts(message: &str) -> Page {
    Either::Left(Flash::success(Redirect::to("/posts"), message.to_string()))
}

async fn upload(root: &Path, image: Option<&mut TempFile<'_>>) -> Result<Option<String>> {
    match image {
        Some(file) => store_image(root, file).await,
        None => Ok(None),
    }
}

#[get("/tickets/create")]
fn create_page(user: AuthUser) -> Template {
    Template::render("feed/ticket_create", context! {
        user: &user,
        form: &form::Context::default(),
    })
}

#[post("/tickets/create", data = "<form>")]
async fn create<'r>(
    user: AuthUser,
    mut db: DbConn,
    config: &State<Config>,
    form: Form<Contextual<'r, TicketForm<'r>>>,
) -> Result<Page> {
    let mut form = form.into_inner();

    if let Some(ref mut fields) = form.value {
        match upload(&config.media_root, fields.image.as_mut()).await {
            Ok(image) => {
                let draft = TicketDraft {
                    title: fields.title,
                    description: fields.description,
                    image: image.as_deref(),
                };
                let stored = create_ticket(&mut db, user.id, &draft, Utc::now().naive_utc());
                remove_unless_saved(&config.media_root, image.as_deref(), stored).await?;
                return Ok(to_posts("Ticket created."));
            }
            Err(Error::Invalid(message)) => {
                form.context.push_error(form::Error::validation(message).with_name("image"));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Either::Right(Template::render("feed/ticket_create", context! {
        user: &user,
        form: &form.context,
    })))
}

#[get("/tickets/create/with-review")]
fn create_with_review_page(user: AuthUser) -> Template {
    Template::render("feed/ticket_and_review_create", context! {
        user: &user,
        form: &form::Context::default(),
    })
}

#[post("/tickets/create/with-review", data = "<form>")]
async fn create_with_review<'r>(
    user: AuthUser,
    mut db: DbConn,
    config: &State<Config>,
    form: Form<Contextual<'r, TicketReviewForm<'r>>>,
) -> Result<Page> {
    let mut form = form.into_inner();

    if let Some(ref mut fields) = form.value {
        match upload(&config.media_root, fields.ticket.image.as_mut()).await {
            Ok(image) => {
                let ticket = TicketDraft {
                    title: fields.ticket.title,
                    description: fields.ticket.description,
                    image: image.as_deref(),
                };
                let review = fields.review.draft();
                let now = Utc::now().naive_utc();
                let stored = create_ticket_with_review(&mut db, user.id, &ticket, &review, now);
                remove_unless_saved(&config.media_root, image.as_deref(), stored).await?;
                return Ok(to_posts("Ticket and review created."));
            }
            Err(Error::Invalid(message)) => {
                let error = form::Error::validation(message).with_name("ticket.image");
                form.context.push_error(error);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Either::Right(Template::render("feed/ticket_and_review_create", context! {
        user: &user,
        form: &form.context,
    })))
}

#[get("/tickets/<id>/update")]
fn update_page(user: AuthUser, mut db: DbConn, id: i32) -> Result<Template> {
    let ticket = owned_ticket(&mut db, id, user.id)?;
    Ok(Template::render("feed/ticket_update", context! {
        user: &user,
        ticket: &ticket,
        form: &form::Context::default(),
    }))
}

#[post("/tickets/<id>/update", data = "<form>")]
async fn update<'r>(
    user: AuthUser,
    mut db: DbConn,
    config: &State<Config>,
    id: i32,
    form: Form<Contextual<'r, TicketForm<'r>>>,
) -> Result<Page> {
    let mut form = form.into_inner();

    let ticket = owned_ticket(&mut db, id, user.id)?;

    if let Some(ref mut fields) = form.value {
        match upload(&config.media_root, fields.image.as_mut()).await {
            Ok(uploaded) => {
                let image = match (uploaded.as_deref(), fields.clear_image) {
                    (Some(path), _) => Some(Some(path)),
                    (None, true) => Some(None),
                    (None, false) => None,
                };
                let changes = TicketChanges {
                    title: fields.title,
                    description: fields.description,
                    image,
                };
                let updated = update_ticket(&mut db, id, user.id, &changes);
                let (_, replaced) =
                    remove_unless_saved(&config.media_root, uploaded.as_deref(), updated).await?;
                if let Some(old) = replaced {
                    remove_image(&config.media_root, &old).await;
                }
                return Ok(to_posts("Ticket updated."));
            }
            Err(Error::Invalid(message)) => {
                form.context.push_error(form::Error::validation(message).with_name("image"));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Either::Right(Template::render("feed/ticket_update", context! {
        user: &user,
        ticket: &ticket,
        form: &form.context,
    })))
}

#[get("/tickets/<id>/delete")]
fn delete_page(user: AuthUser, mut db: DbConn, id: i32) -> Result<Template> {
    let ticket = owned_ticket(&mut db, id, user.id)?;
    Ok(Template::render("feed/ticket_delete", context! {
        user: &user,
        ticket: &ticket,
    }))
}

#[post("/tickets/<id>/delete")]
async fn delete(
    user: AuthUser,
    mut db: DbConn,
    config: &State<Config>,
    id: i32,
) -> Result<Flash<Redirect>> {
    let ticket = delete_ticket(&mut db, id, user.id)?;
    if let Some(image) = ticket.image {
        remove_image(&config.media_root, &image).await;
    }
    Ok(Flash::success(Redirect::to("/posts"), "Ticket deleted."))
}
