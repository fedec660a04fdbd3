use chrono::Utc;
use rocket::http::Status;
use rocket::outcome::{try_outcome, Outcome};
use rocket::request::{self, FromRequest};
use rocket::{Request, State};
use serde_derive::Serialize;

use crate::auth_service::session_user;
use crate::db_connection::DbConn;
use crate::environment::Environment;

/// The account behind the session cookie of the current request.
///
/// Requests without a valid session are forwarded with `401 Unauthorized`, so
/// an application can catch that status and send the visitor to its login page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let env = try_outcome!(request.guard::<&State<Environment>>().await);
        let token = match request.cookies().get(env.cookie_name()) {
            Some(cookie) => cookie.value().to_string(),
            None => return Outcome::Forward(Status::Unauthorized),
        };

        let mut db = try_outcome!(request.guard::<DbConn>().await);
        match session_user(&mut db, &token, Utc::now().naive_utc()) {
            Ok(Some(user)) => Outcome::Success(AuthUser { id: user.id, username: user.username }),
            Ok(None) => {
                request.cookies().remove(crate::routes::auth_cookie_ref(env));
                Outcome::Forward(Status::Unauthorized)
            }
            Err(err) => {
                tracing::error!("failed to resolve session: {}", err);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
