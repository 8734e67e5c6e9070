use thiserror::Error;

pub mod input;
pub mod output;
pub mod subcommand;

#[derive(Clone, Error, Debug, Eq, PartialEq)]
pub enum ReportError {
    // Invalid value range has been entered.
    #[error("invalid value range supplied")]
    InvalidRange,
    // Indicates that given data has not enough length.
    #[error("a length of the data is too short, expected at least {expected} byte(s) but got {actual}")]
    TooShort { expected: usize, actual: usize },
    // Indicates that given data is malformed thus cannot be processed.
    #[error("the data is malformed thus cannot be processed")]
    Malformed,
    // Returned when accessing/processing data that do not support given bounds.
    #[error("out of bounds; offset {offset:#X} with size {size:#X} is not addressable")]
    OutOfBounds { offset: u32, size: usize },
}
