use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token looked like an option but matched no registered spec.
    #[error("{0} is not a valid option")]
    InvalidOption(String),
    /// An option requiring an argument was not followed by one.
    #[error("Missing required argument for option {0}")]
    MissingArgument(String),
    /// The option's matcher callback rejected the supplied value.
    #[error("Argument {value:?} was not accepted for option {option}")]
    ArgumentRejected { option: String, value: String },
}

pub type ParseResult<T> = Result<T, ParseError>;
