use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("message log not found: {0}")]
    LogNotFound(String),

    #[error("message {0} was already delivered")]
    AlreadyDelivered(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type MessagingResult<T> = Result<T, MessagingError>;
