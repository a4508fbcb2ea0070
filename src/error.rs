//! Status codes and error types for ADF operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for ADF operations
pub type Result<T> = std::result::Result<T, AdfError>;

/// The closed set of ADF status codes.
///
/// This is the on-wire/ABI status table shared by every ADF implementation.
/// The `Null*` codes exist for bindings that pass raw source/target buffers
/// across a language boundary; owned Rust values cannot be null, so no
/// operation in this crate ever produces them, but the table keeps their
/// numeric slots so codes stay comparable across implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum StatusCode {
    /// No errors detected
    Ok = 0x0000,
    /// Header bytes failed CRC or field validation
    HeaderCorrupted = 0x0001,
    /// Metadata bytes failed CRC or field validation
    MetadataCorrupted = 0x0002,
    /// A series failed CRC or field validation
    SeriesCorrupted = 0x0003,
    /// A series was submitted with `repeated == 0`
    ZeroRepeatedSeries = 0x0004,
    /// A removal was attempted on a container with no series
    EmptySeries = 0x0005,
    /// A time index mapped outside the stored series range
    TimeOutOfBound = 0x0006,
    /// An additive list exceeded the configured maximum
    AdditiveOverflow = 0x0007,
    NullHeaderSource = 0x0008,
    NullHeaderTarget = 0x0009,
    NullMetaSource = 0x000A,
    NullMetaTarget = 0x000B,
    NullSeriesSource = 0x000C,
    NullSeriesTarget = 0x000D,
    NullSource = 0x000E,
    NullTarget = 0x000F,
    NullAdditiveSource = 0x0010,
    NullAdditiveTarget = 0x0011,
    /// The most generic error code
    RuntimeError = 0xFFFF,
}

impl StatusCode {
    /// Look up a status code by its numeric value.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0000 => Some(Self::Ok),
            0x0001 => Some(Self::HeaderCorrupted),
            0x0002 => Some(Self::MetadataCorrupted),
            0x0003 => Some(Self::SeriesCorrupted),
            0x0004 => Some(Self::ZeroRepeatedSeries),
            0x0005 => Some(Self::EmptySeries),
            0x0006 => Some(Self::TimeOutOfBound),
            0x0007 => Some(Self::AdditiveOverflow),
            0x0008 => Some(Self::NullHeaderSource),
            0x0009 => Some(Self::NullHeaderTarget),
            0x000A => Some(Self::NullMetaSource),
            0x000B => Some(Self::NullMetaTarget),
            0x000C => Some(Self::NullSeriesSource),
            0x000D => Some(Self::NullSeriesTarget),
            0x000E => Some(Self::NullSource),
            0x000F => Some(Self::NullTarget),
            0x0010 => Some(Self::NullAdditiveSource),
            0x0011 => Some(Self::NullAdditiveTarget),
            0xFFFF => Some(Self::RuntimeError),
            _ => None,
        }
    }
}

/// Errors surfaced by fallible ADF operations.
///
/// Every variant maps onto exactly one [`StatusCode`] via
/// [`AdfError::status`]; the variants additionally carry enough context to
/// tell *which* invariant failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdfError {
    /// Header section failed CRC or field validation
    #[error("header corrupted: {message}")]
    HeaderCorrupted { message: String },

    /// Metadata section failed CRC or field validation
    #[error("metadata corrupted: {message}")]
    MetadataCorrupted { message: String },

    /// Series section failed CRC or field validation
    #[error("series {index} corrupted: {message}")]
    SeriesCorrupted { index: u32, message: String },

    /// A series must represent at least one measurement cycle
    #[error("series has a repetition count of zero")]
    ZeroRepeatedSeries,

    /// Removal from a container that holds no series
    #[error("container holds no series")]
    EmptySeries,

    /// A timestamp mapped outside the valid range
    #[error("time out of bound: {message}")]
    TimeOutOfBound { message: String },

    /// An additive list is larger than [`crate::additive::ADDITIVE_LIMIT`]
    #[error("additive overflow: {count} additives exceed the limit of {limit}")]
    AdditiveOverflow { count: usize, limit: usize },

    /// Unclassified failure
    #[error("runtime error: {message}")]
    RuntimeError { message: String },
}

impl AdfError {
    /// Create a header corruption error
    pub fn header_corrupted<S: Into<String>>(message: S) -> Self {
        Self::HeaderCorrupted {
            message: message.into(),
        }
    }

    /// Create a metadata corruption error
    pub fn metadata_corrupted<S: Into<String>>(message: S) -> Self {
        Self::MetadataCorrupted {
            message: message.into(),
        }
    }

    /// Create a series corruption error for the series at `index`
    pub fn series_corrupted<S: Into<String>>(index: u32, message: S) -> Self {
        Self::SeriesCorrupted {
            index,
            message: message.into(),
        }
    }

    /// Create a time-out-of-bound error
    pub fn time_out_of_bound<S: Into<String>>(message: S) -> Self {
        Self::TimeOutOfBound {
            message: message.into(),
        }
    }

    /// Create an additive overflow error
    pub fn additive_overflow(count: usize, limit: usize) -> Self {
        Self::AdditiveOverflow { count, limit }
    }

    /// Create a runtime error
    pub fn runtime<S: Into<String>>(message: S) -> Self {
        Self::RuntimeError {
            message: message.into(),
        }
    }

    /// The status code this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::HeaderCorrupted { .. } => StatusCode::HeaderCorrupted,
            Self::MetadataCorrupted { .. } => StatusCode::MetadataCorrupted,
            Self::SeriesCorrupted { .. } => StatusCode::SeriesCorrupted,
            Self::ZeroRepeatedSeries => StatusCode::ZeroRepeatedSeries,
            Self::EmptySeries => StatusCode::EmptySeries,
            Self::TimeOutOfBound { .. } => StatusCode::TimeOutOfBound,
            Self::AdditiveOverflow { .. } => StatusCode::AdditiveOverflow,
            Self::RuntimeError { .. } => StatusCode::RuntimeError,
        }
    }
}
