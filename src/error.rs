use jsonwebtoken::errors::Error as JwtError;
use mongodb::{bson::oid::Error as OidError, error::Error as DbError};
use rocket::{
    http::Status,
    response::{status::Custom, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::common::{IssueStatus, VoteDirection};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    OidParse(#[from] OidError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] Conflict),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(why: impl Into<String>) -> Self {
        Self::Forbidden(why.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) | Self::OidParse(_) => Status::BadRequest,
            Self::Conflict(_) => Status::Conflict,
            Self::NotFound(_) => Status::NotFound,
            Self::Forbidden(_) => Status::Forbidden,
            Self::Unauthorized(_) | Self::Jwt(_) => Status::Unauthorized,
            Self::Storage(_) => Status::ServiceUnavailable,
            Self::Db(_) => Status::InternalServerError,
        }
    }
}

/// Malformed or missing input. Nothing has been written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("unknown category '{0}'")]
    InvalidCategory(String),
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("comment cannot be empty")]
    EmptyComment,
    #[error("comment exceeds {max} characters")]
    CommentTooLong { max: usize },
    #[error("unknown status '{0}'")]
    InvalidStatus(String),
}

/// The requested action clashes with the current state of the issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("you have already {0}d this issue")]
    AlreadyVoted(VoteDirection),
    #[error("you have already reported this issue")]
    AlreadyReported,
    #[error("cannot move an issue from '{from}' to '{to}'")]
    IllegalTransition { from: IssueStatus, to: IssueStatus },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        Custom(status, Json(body)).respond_to(req)
    }
}
