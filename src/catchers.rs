use rocket::http::Status;
use rocket::response::Redirect;
use rocket::{catch, catchers, Catcher, Request};
use rocket_dyn_templates::{context, Template};

pub fn catchers() -> Vec<Catcher> {
    catchers![unauthorized, forbidden, not_found, internal_error]
}

fn error_page(status: Status, message: &str) -> Template {
    Template::render("error", context! {
        code: status.code,
        reason: status.reason().unwrap_or_default(),
        message: message,
    })
}

/// Anonymous visitors go to the login page.
#[catch(401)]
fn unauthorized() -> Redirect {
    Redirect::to("/")
}

#[catch(403)]
fn forbidden() -> Template {
    error_page(Status::Forbidden, "You do not have permission to do that.")
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> Template {
    tracing::debug!(path = %request.uri(), "no such page");
    error_page(Status::NotFound, "This page does not exist.")
}

#[catch(500)]
fn internal_error() -> Template {
    error_page(Status::InternalServerError, "Something went wrong on our side.")
}
