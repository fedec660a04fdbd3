use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use rand::distributions::Alphanumeric;
use rand::Rng;
use time::Duration;

use crate::error::AuthError;
use crate::models::{NewSession, NewUser, User};
use crate::password::{hash_password, verify_password};

const TOKEN_LENGTH: usize = 48;

/// Registers a new active account.
pub fn register(
    conn: &mut SqliteConnection,
    name: &str,
    password: &str,
) -> Result<User, AuthError> {
    use crate::schema::users::dsl::*;

    let hash = hash_password(password)?;
    let new_user = NewUser {
        username: name,
        password_hash: &hash,
        date_joined: Utc::now().naive_utc(),
        is_active: true,
    };

    diesel::insert_into(users)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                AuthError::UsernameTaken
            }
            err => AuthError::from(err),
        })
}

/// Checks a username/password pair. Unknown users and inactive accounts are
/// reported exactly like a wrong password.
pub fn authenticate(
    conn: &mut SqliteConnection,
    name: &str,
    password: &str,
) -> Result<User, AuthError> {
    use crate::schema::users::dsl::*;

    let user = users
        .filter(username.eq(name))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    match user {
        Some(user) if user.is_active && verify_password(&user.password_hash, password) => Ok(user),
        _ => Err(AuthError::InvalidCredentials),
    }
}

/// Stores a fresh session for the user and returns its token.
pub fn open_session(
    conn: &mut SqliteConnection,
    uid: i32,
    lifetime: Duration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let new_token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();

    {
        use crate::schema::sessions::dsl::*;

        let new_session = NewSession {
            token: &new_token,
            expires: now.timestamp() + lifetime.whole_seconds(),
            user_id: uid,
        };
        diesel::insert_into(sessions).values(&new_session).execute(conn)?;
    }

    {
        use crate::schema::users::dsl::*;

        diesel::update(users.find(uid))
            .set(last_login.eq(Some(now.naive_utc())))
            .execute(conn)?;
    }

    Ok(new_token)
}

/// Resolves a session token to its user. Expired sessions are removed on sight.
pub fn session_user(
    conn: &mut SqliteConnection,
    session_token: &str,
    now: NaiveDateTime,
) -> Result<Option<User>, AuthError> {
    use crate::schema::{sessions, users};

    let found = sessions::table
        .inner_join(users::table)
        .filter(sessions::token.eq(session_token))
        .select((sessions::expires, User::as_select()))
        .first::<(i64, User)>(conn)
        .optional()?;

    match found {
        Some((expires, _)) if expires <= now.and_utc().timestamp() => {
            close_session(conn, session_token)?;
            Ok(None)
        }
        Some((_, user)) if user.is_active => Ok(Some(user)),
        _ => Ok(None),
    }
}

pub fn close_session(conn: &mut SqliteConnection, session_token: &str) -> Result<(), AuthError> {
    use crate::schema::sessions::dsl::*;

    diesel::delete(sessions.find(session_token)).execute(conn)?;
    Ok(())
}
