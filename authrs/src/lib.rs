//! Accounts for a Rocket application: users, password hashing, cookie
//! sessions and the login/signup/logout pages.
//!
//! Mount [`routes::routes`] at `/`, manage an [`environment::Environment`] and
//! a [`db_connection::SqlitePool`], and take an [`AuthUser`] in any handler
//! that needs a logged-in visitor.

pub mod auth_service;
pub mod db_connection;
pub mod environment;
pub mod error;
pub mod guard;
pub mod models;
pub mod password;
pub mod routes;
pub mod schema;

pub use guard::AuthUser;
