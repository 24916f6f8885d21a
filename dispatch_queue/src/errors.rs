use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatch thread was shut down; the posted job was not accepted.
    #[error("The dispatch thread is stopped and does not accept jobs anymore")]
    Stopped,
}

pub type DispatchResult<T> = Result<T, DispatchError>;
