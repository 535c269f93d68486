use std::result;
use std::sync::PoisonError;

use thiserror::Error as ThisError;
use serenity::prelude::SerenityError;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("{0}")]
    SerenityError(String),
    #[error("{0}")]
    Lock(String),
    #[error("{0}")]
    Configuration(String),
    #[error("Invalid duration format: {0}. Use 30s, 5m, 1h or 2d.")]
    InvalidDurationFormat(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("This giveaway no longer exists.")]
    NotFound,
    #[error("This giveaway has already ended.")]
    Closed,
    #[error("The time for joining this giveaway has expired.")]
    Expired,
    #[error("{0}")]
    Forbidden(String),
    #[error("Can't deliver the giveaway announcement: {0}")]
    AnnouncementDeliveryFailed(String),
}

impl From<SerenityError> for Error {
    fn from(err: SerenityError) -> Error {
        let description = err.to_string();
        Error::SerenityError(description)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Error {
        let description = format!("The giveaway lock was poisoned: {}", err);
        Error::Lock(description)
    }
}
