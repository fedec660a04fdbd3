use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::{sessions, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users, check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    /// argon2 PHC string.
    pub password_hash: String,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub date_joined: NaiveDateTime,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession<'a> {
    pub token: &'a str,
    pub expires: i64,
    pub user_id: i32,
}
