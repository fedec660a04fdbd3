use rocket::form;
use rocket::request::FlashMessage;
use rocket::Route;
use serde_derive::Serialize;

pub mod feed;
pub mod follows;
pub mod reviews;
pub mod tickets;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(feed::routes());
    routes.extend(follows::routes());
    routes.extend(tickets::routes());
    routes.extend(reviews::routes());
    routes
}

/// A flash message as the templates see it.
#[derive(Debug, Serialize)]
pub struct Notice {
    pub kind: String,
    pub message: String,
}

impl Notice {
    pub fn from_flash(flash: Option<FlashMessage<'_>>) -> Option<Notice> {
        flash.map(|flash| {
            let (kind, message) = flash.into_inner();
            Notice { kind, message }
        })
    }
}

/// Like rocket's `len`, but counts characters rather than bytes.
pub fn char_len<'v>(value: &str, min: usize, max: usize) -> form::Result<'v, ()> {
    let count = value.chars().count();
    if count < min {
        return Err(form::Error::validation("This field is required.").into());
    }
    if count > max {
        let message =
            format!("Ensure this value has at most {} characters (it has {}).", max, count);
        return Err(form::Error::validation(message).into());
    }
    Ok(())
}
