//! This module aggregates errors that may emerge from the library.
use crate::value::ValueType;
use crate::Tag;
use snafu::Snafu;
use std::num::{ParseFloatError, ParseIntError};
use std::result;

/// The main data type for errors in the library.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Raised when the obtained data element was not the one expected.
    #[snafu(display("Unexpected DICOM tag {}", tag))]
    UnexpectedTag {
        /// the tag found in the stream
        tag: Tag,
    },
    /// Raised when the obtained length is inconsistent.
    #[snafu(display("Inconsistent data value length in data element"))]
    UnexpectedDataValueLength,
    /// Raised when a tag does not correspond to a known delimiter
    /// (item, item delimiter, or sequence delimiter).
    #[snafu(display("Unexpected element, not a recognized delimiter"))]
    UnexpectedElement,
    /// Error related to an invalid value read.
    #[snafu(display("Invalid value read: {}", source))]
    ReadValue {
        /// the underlying cause
        source: InvalidValueReadError,
    },
    /// A failed attempt to cast a value to an inappropriate format.
    #[snafu(display("Failed value cast: {}", source))]
    CastValue {
        /// the underlying cause
        source: CastValueError,
    },
}

impl From<InvalidValueReadError> for Error {
    fn from(source: InvalidValueReadError) -> Self {
        Error::ReadValue { source }
    }
}

impl From<CastValueError> for Error {
    fn from(source: CastValueError) -> Self {
        Error::CastValue { source }
    }
}

/// Type alias for a result from this library.
pub type Result<T> = result::Result<T, Error>;

/// Triggered when a value parsing attempt fails.
///
/// Used both by the low-level date/time token parsers in
/// [`value::deserialize`](crate::value::deserialize) and by the
/// higher-level range conversions on [`PrimitiveValue`](crate::value::PrimitiveValue).
#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum InvalidValueReadError {
    /// The value cannot be read as a primitive value.
    #[snafu(display("attempted to retrieve complex value as primitive"))]
    NonPrimitiveType,
    /// The value's effective length cannot be resolved.
    #[snafu(display("value length could not be resolved"))]
    UnresolvedValueLength,
    /// The value does not have the expected format.
    #[snafu(display("invalid token: expected {} but got {:?}", expected, got))]
    InvalidToken {
        /// the offending byte
        got: u8,
        /// a description of what was expected
        expected: &'static str,
    },
    /// The value does not have the expected length.
    #[snafu(display("invalid length: expected {} but got {}", expected, got))]
    InvalidLength {
        /// the actual number of bytes found
        got: usize,
        /// a description of what was expected
        expected: &'static str,
    },
    /// Invalid date or time component.
    #[snafu(display("invalid date/time component: expected {} but got {}", expected, got))]
    ParseDateTime {
        /// the component value found
        got: u32,
        /// a description of the component expected
        expected: &'static str,
    },
    /// Invalid or ambiguous combination of date with time.
    #[snafu(display("invalid or ambiguous combination of date with time"))]
    DateTimeZone,
    /// A range conversion requires exactly two values but did not receive them.
    #[snafu(display("expected exactly two values for range, got {}", len))]
    TwoValuesForRange {
        /// the number of values actually found
        len: usize,
    },
    /// chrono error when parsing a date or time.
    #[snafu(display("failed to parse date/time: {}", source))]
    Chrono {
        /// the underlying chrono error
        source: chrono::ParseError,
    },
    /// The value cannot be parsed to a floating point number.
    #[snafu(display("failed to parse text value as a floating point number: {}", source))]
    ParseFloat {
        /// the underlying parse error
        source: ParseFloatError,
    },
    /// The value cannot be parsed to an integer.
    #[snafu(display("failed to parse text value as an integer: {}", source))]
    ParseInteger {
        /// the underlying parse error
        source: ParseIntError,
    },
    /// An attempt of reading more than the number of bytes in the length attribute was made.
    #[snafu(display("unexpected end of element"))]
    UnexpectedEndOfElement,
    /// A date, time or date-time token stream did not form a valid value.
    #[snafu(display("invalid date/time value"))]
    InvalidDateTimeValue,
}

impl From<crate::value::deserialize::Error> for InvalidValueReadError {
    fn from(_: crate::value::deserialize::Error) -> Self {
        InvalidValueReadError::InvalidDateTimeValue
    }
}

impl From<chrono::ParseError> for InvalidValueReadError {
    fn from(source: chrono::ParseError) -> Self {
        InvalidValueReadError::Chrono { source }
    }
}

impl From<ParseFloatError> for InvalidValueReadError {
    fn from(source: ParseFloatError) -> Self {
        InvalidValueReadError::ParseFloat { source }
    }
}

impl From<ParseIntError> for InvalidValueReadError {
    fn from(source: ParseIntError) -> Self {
        InvalidValueReadError::ParseInteger { source }
    }
}

/// An error type for an attempt of accessing a value
/// in an inappropriate format.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("bad value cast: requested {} but value is {:?}", requested, got))]
pub struct CastValueError {
    /// The value format requested
    pub requested: &'static str,
    /// The value's actual representation
    pub got: ValueType,
}

/// An error type for an unsuccessful conversion
/// between different representations of a DICOM value
/// (for example converting a string into a date, or into a range of dates).
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("could not convert value to {}: value is {:?}", requested, original))]
pub struct ConvertValueError {
    /// The value format requested
    pub requested: &'static str,
    /// The value's actual representation
    pub original: ValueType,
    /// The underlying cause of the conversion failure, if any
    pub cause: Option<InvalidValueReadError>,
}
