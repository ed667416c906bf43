use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};

#[derive(Debug)]
pub enum RequestError {
    Validation { reason: String },
    Store(sqlx::Error),
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation { .. } => None,
            Self::Store(error) => Some(error),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { reason } => write!(f, "invalid score submission: {}", reason),
            Self::Store(error) => write!(f, "highscore store operation failed: {}", error),
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(error: sqlx::Error) -> Self {
        Self::Store(error)
    }
}

impl<'r> Responder<'r, 'static> for RequestError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let (status, message) = match self {
            Self::Validation { reason } => (Status::BadRequest, reason),
            Self::Store(error) => {
                log::error!("highscore store operation failed: {}", error);
                // The cause stays in the log; callers get a generic body.
                (
                    Status::InternalServerError,
                    String::from("an error occurred talking to the highscore store"),
                )
            }
        };

        Response::build_from(message.respond_to(request)?)
            .status(status)
            .ok()
    }
}

pub type RequestResult<T, E = RequestError> = std::result::Result<T, E>;
