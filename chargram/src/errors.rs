//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = ChargramError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum ChargramError {
    InvalidArgument(InvalidArgumentError),
    UnknownSymbol(UnknownSymbolError),
    IndexOutOfRange(IndexOutOfRangeError),
    ShapeMismatch(ShapeMismatchError),
    PreconditionViolated(PreconditionViolatedError),
    IOError(std::io::Error),
}

impl ChargramError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn unknown_symbol(symbol: char) -> Self {
        Self::UnknownSymbol(UnknownSymbolError { symbol })
    }

    pub(crate) fn index_out_of_range(arg: &'static str, index: usize, size: usize) -> Self {
        Self::IndexOutOfRange(IndexOutOfRangeError { arg, index, size })
    }

    pub(crate) fn shape_mismatch<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::ShapeMismatch(ShapeMismatchError { msg: msg.into() })
    }

    pub(crate) fn precondition_violated<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::PreconditionViolated(PreconditionViolatedError { msg: msg.into() })
    }
}

impl fmt::Display for ChargramError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(e) => e.fmt(f),
            Self::UnknownSymbol(e) => e.fmt(f),
            Self::IndexOutOfRange(e) => e.fmt(f),
            Self::ShapeMismatch(e) => e.fmt(f),
            Self::PreconditionViolated(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for ChargramError {}

/// Error used when an argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a character is not in the vocabulary.
#[derive(Debug)]
pub struct UnknownSymbolError {
    /// The offending character.
    pub(crate) symbol: char,
}

impl fmt::Display for UnknownSymbolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "UnknownSymbolError: {:?} is not in the vocabulary",
            self.symbol
        )
    }
}

impl Error for UnknownSymbolError {}

/// Error used when an index is outside the valid range.
#[derive(Debug)]
pub struct IndexOutOfRangeError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// The offending index.
    pub(crate) index: usize,

    /// Size of the valid range.
    pub(crate) size: usize,
}

impl fmt::Display for IndexOutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IndexOutOfRangeError: {}: {} is out of range for size {}",
            self.arg, self.index, self.size
        )
    }
}

impl Error for IndexOutOfRangeError {}

/// Error used when matrix or batch shapes disagree.
#[derive(Debug)]
pub struct ShapeMismatchError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for ShapeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ShapeMismatchError: {}", self.msg)
    }
}

impl Error for ShapeMismatchError {}

/// Error used when an operation is requested in a state that does not
/// support it.
#[derive(Debug)]
pub struct PreconditionViolatedError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for PreconditionViolatedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PreconditionViolatedError: {}", self.msg)
    }
}

impl Error for PreconditionViolatedError {}

impl From<std::io::Error> for ChargramError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
