use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_derive::Serialize;

use crate::schema::{reviews, tickets, user_follows, users};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = tickets, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ticket {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Path relative to the media root.
    pub image: Option<String>,
    pub user_id: i32,
    pub time_create: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicket<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image: Option<&'a str>,
    pub user_id: i32,
    pub time_create: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = tickets)]
pub struct TicketChanges<'a> {
    pub title: &'a str,
    pub description: &'a str,
    // Some(None) clears the image, None leaves it alone.
    pub image: Option<Option<&'a str>>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize)]
#[diesel(table_name = reviews, belongs_to(Ticket), check_for_backend(diesel::sqlite::Sqlite))]
pub struct Review {
    pub id: i32,
    pub ticket_id: i32,
    pub rating: i16,
    pub user_id: i32,
    pub headline: String,
    pub body: String,
    pub time_create: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview<'a> {
    pub ticket_id: i32,
    pub rating: i16,
    pub user_id: i32,
    pub headline: &'a str,
    pub body: &'a str,
    pub time_create: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = reviews)]
pub struct ReviewChanges<'a> {
    pub rating: i16,
    pub headline: &'a str,
    pub body: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = user_follows)]
pub struct NewUserFollow {
    pub user_id: i32,
    pub followed_user_id: i32,
}

/// Public face of an account: what other users get to see.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = users, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Member {
    pub id: i32,
    pub username: String,
}
