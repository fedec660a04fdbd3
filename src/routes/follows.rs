use rocket::form::Form;
use rocket::FromForm;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{get, post, routes, Route};
use rocket_dyn_templates::{context, Template};

use authrs::AuthUser;

use crate::db_connection::DbConn;
use crate::error::Result;
use crate::follows::{follow, followed_users, followers, unfollow};
use crate::models::Member;
use crate::routes::Notice;

const SUBSCRIPTIONS: &str = "/abonnements";

#[derive(Debug, FromForm)]
pub struct FollowForm<'r> {
    pub username_to_follow: &'r str,
}

pub fn routes() -> Vec<Route> {
    routes![abonnements, follow_user, unfollow_user]
}

fn flash(success: bool, message: String) -> Flash<Redirect> {
    let to = Redirect::to(SUBSCRIPTIONS);
    if success {
        Flash::success(to, message)
    } else {
        Flash::error(to, message)
    }
}

#[get("/abonnements")]
fn abonnements(
    user: AuthUser,
    mut db: DbConn,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template> {
    let followed = followed_users(&mut db, user.id)?;
    let following_me = followers(&mut db, user.id)?;
    Ok(Template::render("users/followed_users", context! {
        user: &user,
        followed_users: followed,
        followers: following_me,
        flash: Notice::from_flash(flash),
    }))
}

#[post("/follow", data = "<form>")]
fn follow_user(
    user: AuthUser,
    mut db: DbConn,
    form: Form<FollowForm<'_>>,
) -> Result<Flash<Redirect>> {
    let me = Member { id: user.id, username: user.username };
    let outcome = follow(&mut db, &me, form.username_to_follow)?;
    Ok(flash(outcome.is_success(), outcome.message()))
}

#[get("/unfollow/<id>")]
fn unfollow_user(user: AuthUser, mut db: DbConn, id: i32) -> Result<Flash<Redirect>> {
    let outcome = unfollow(&mut db, user.id, id)?;
    Ok(flash(outcome.is_success(), outcome.message()))
}
