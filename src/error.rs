use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::Request;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Auth(#[from] authrs::error::AuthError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'o> {
        let status = match self {
            Error::NotFound => Status::NotFound,
            Error::Forbidden(reason) => {
                tracing::warn!(path = %request.uri(), "permission denied: {}", reason);
                Status::Forbidden
            }
            Error::Invalid(_) => Status::UnprocessableEntity,
            _ => {
                tracing::error!(path = %request.uri(), "{}", self);
                Status::InternalServerError
            }
        };

        status.respond_to(request)
    }
}
