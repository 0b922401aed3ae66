use std::fmt;

/// Every failure in this crate is an invalid-argument condition; the variant names the cause.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad index, slice window or reduction axis.
    InvalidArgument(String),
    /// Operands whose dimensions cannot be combined.
    InvalidShape(String),
    InvalidConfig(String),
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
