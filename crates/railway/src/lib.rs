use std::error::Error;

use model::seat::Seat;
use utility::id::Id;

pub mod client;
pub mod database;
pub mod inventory;
pub mod memory;
pub mod reservation;

pub use client::Client;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("the requested item does not exist")]
    NotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("seat {0} is not available")]
    SeatUnavailable(Id<Seat>),
    #[error("the request conflicts with existing data")]
    Conflict,
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub fn invalid<S: Into<String>>(reason: S) -> Self {
        Self::InvalidRequest(reason.into())
    }
}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Conflict => Self::Conflict,
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
