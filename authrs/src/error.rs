use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::Request;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
    #[error("{0} must be set")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl<'r, 'o: 'r> Responder<'r, 'o> for AuthError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'o> {
        let status = match self {
            AuthError::InvalidCredentials => Status::Unauthorized,
            AuthError::UsernameTaken => Status::Conflict,
            _ => {
                tracing::error!("{}", self);
                Status::InternalServerError
            }
        };

        status.respond_to(request)
    }
}
