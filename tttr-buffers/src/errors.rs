use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq)]
pub enum Error {
    #[error("Buffer capacity must be positive, got {0}.")]
    InvalidCapacity(usize),
    #[error("{0}")]
    InvalidParams(String),
}
