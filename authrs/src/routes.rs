use rocket::Either;
use rocket::form::{self, Contextual, Form};
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::response::Redirect;
use rocket::{get, post, routes, FromForm, Route, State};
use rocket_dyn_templates::{context, Template};

use crate::auth_service::{authenticate, close_session, open_session, register};
use crate::db_connection::DbConn;
use crate::environment::Environment;
use crate::error::AuthError;
use crate::guard::AuthUser;
use crate::password::{validate_password, validate_username};

#[derive(Debug, FromForm)]
pub struct LoginForm<'r> {
    #[field(validate = len(1..=30))]
    pub username: &'r str,
    #[field(validate = len(1..=128))]
    pub password: &'r str,
}

#[derive(Debug, FromForm)]
pub struct SignupForm<'r> {
    #[field(validate = len(3..=30))]
    #[field(validate = validate_username())]
    pub username: &'r str,
    #[field(validate = len(..=128))]
    #[field(validate = validate_password())]
    pub password1: &'r str,
    #[field(validate = eq(self.password1).or_else(msg!("The two password fields didn't match.")))]
    pub password2: &'r str,
}

pub fn routes() -> Vec<Route> {
    routes![login_page, login, signup_page, signup, logout]
}

fn create_auth_cookie(value: String, env: &Environment) -> Cookie<'static> {
    Cookie::build((env.cookie_name().to_string(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(env.uses_https())
        .max_age(env.login_time())
        .build()
}

pub(crate) fn auth_cookie_ref(env: &Environment) -> Cookie<'static> {
    Cookie::build(env.cookie_name().to_string())
        .path("/")
        .build()
}

#[get("/")]
fn login_page(user: Option<AuthUser>, env: &State<Environment>) -> Either<Redirect, Template> {
    if user.is_some() {
        return Either::Left(Redirect::to(env.login_redirect().to_string()));
    }

    Either::Right(Template::render("users/login", context! {
        form: &form::Context::default(),
        message: "",
    }))
}

#[post("/", data = "<form>")]
fn login<'r>(
    mut db: DbConn,
    cookies: &CookieJar<'_>,
    env: &State<Environment>,
    form: Form<Contextual<'r, LoginForm<'r>>>,
) -> Result<Either<Redirect, Template>, AuthError> {
    let message = match form.value {
        Some(ref credentials) => match authenticate(
            &mut db,
            credentials.username,
            credentials.password,
        ) {
            Ok(user) => {
                let token = open_session(&mut db, user.id, env.login_time())?;
                cookies.add(create_auth_cookie(token, env));
                tracing::info!(username = %user.username, "user logged in");
                return Ok(Either::Left(Redirect::to(env.login_redirect().to_string())));
            }
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!(username = %credentials.username, "failed login attempt");
                "Invalid credentials."
            }
            Err(err) => return Err(err),
        },
        None => "",
    };

    Ok(Either::Right(Template::render("users/login", context! {
        form: &form.context,
        message: message,
    })))
}

#[get("/signup")]
fn signup_page() -> Template {
    Template::render("users/signup", context! { form: &form::Context::default() })
}

#[post("/signup", data = "<form>")]
fn signup<'r>(
    mut db: DbConn,
    cookies: &CookieJar<'_>,
    env: &State<Environment>,
    form: Form<Contextual<'r, SignupForm<'r>>>,
) -> Result<Either<Redirect, Template>, AuthError> {
    let mut form = form.into_inner();

    if let Some(ref fields) = form.value {
        match register(&mut db, fields.username, fields.password1) {
            Ok(user) => {
                let token = open_session(&mut db, user.id, env.login_time())?;
                cookies.add(create_auth_cookie(token, env));
                tracing::info!(username = %user.username, "user signed up");
                return Ok(Either::Left(Redirect::to(env.login_redirect().to_string())));
            }
            Err(AuthError::UsernameTaken) => {
                let error = form::Error::validation("A user with that username already exists.")
                    .with_name("username");
                form.context.push_error(error);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Either::Right(Template::render("users/signup", context! { form: &form.context })))
}

#[get("/logout")]
fn logout(
    mut db: DbConn,
    cookies: &CookieJar<'_>,
    env: &State<Environment>,
) -> Result<Redirect, AuthError> {
    if let Some(cookie) = cookies.get(env.cookie_name()) {
        close_session(&mut db, cookie.value())?;
    }
    cookies.remove(auth_cookie_ref(env));

    Ok(Redirect::to("/"))
}
