//! Error types for the library

use thiserror::Error;

/// Main error type aggregating every subsystem failure
#[derive(Error, Debug)]
pub enum Error {
    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Frame error
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Series error
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    /// Operator error
    #[error("Operator error: {0}")]
    Op(#[from] OpError),
}

/// Errors surfaced by the bit stream and the XOR codecs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The bit stream ended in the middle of a codeword
    #[error("Decode truncated at byte {byte}, bit {bit}")]
    DecodeTruncated {
        /// Byte offset the reader had reached
        byte: usize,
        /// Bit offset within that byte
        bit: u8,
    },

    /// More than 64 bits requested from a single read
    #[error("Invalid bit count: {0}")]
    InvalidBitCount(u8),

    /// Unreachable for the closed numeric set, retained as a defensive path
    #[error("Unsupported element type: {0}")]
    UnsupportedType(&'static str),
}

/// Errors surfaced by frame operations
#[derive(Error, Debug)]
pub enum FrameError {
    /// Frame used before initialization
    #[error("Uninitialized frame")]
    Uninitialized,

    /// Element access beyond the logical size or capacity
    #[error("Index {index} out of range for frame of {len} elements")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// The frame's element count or capacity
        len: usize,
    },

    /// Packing or unpacking failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Errors surfaced by series operations
#[derive(Error, Debug)]
pub enum SeriesError {
    /// Element access beyond the logical size
    #[error("Index {index} out of range for series of {size} elements")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// The series size
        size: usize,
    },

    /// A frame operation failed
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Errors produced by the operator algebra
///
/// These are carried inside a [`MaybeOp`](crate::ops::MaybeOp) and propagate
/// unchanged through every subsequent `apply` in a chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// Operator applied to an empty view
    #[error("Operator applied to an empty input")]
    EmptyInput,

    /// Binary operator applied to views of different length
    #[error("Operand length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first captured view
        left: usize,
        /// Length of the second view
        right: usize,
    },

    /// Windowed operator with fewer elements than a single window
    #[error("Window of {window} too large for {len} elements")]
    WindowTooLarge {
        /// View length
        len: usize,
        /// Requested window size
        window: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
