//! Compact time-series frames with XOR compression and windowed operators
//!
//! This library stores numeric time series in compact form and computes
//! over them:
//!
//! - **Codecs**: streaming [Gorilla](codec::Gorilla) (VLDB 2015) and
//!   [Chimp](codec::Chimp) (VLDB 2022) XOR compression over 64-bit words,
//!   with an optional NOP/Offset/Delta pre-transform
//! - **Frames**: lazy dual-state containers ([`frame::Frame`]) holding
//!   packed bytes, native values, or both
//! - **Series**: a frame-sharded append-only log of `(time, value)` pairs
//!   ([`series::Series`])
//! - **Operators**: windowed reductions and pairwise combinators composed
//!   through a short-circuiting [`ops::MaybeOp`] chain
//!
//! Element types are fixed at `i64`, `u64` and `f64` (the sealed
//! [`types::Number`] trait).
//!
//! # Example
//!
//! ```
//! use tsframe::ops::{OpSum, TxSeries};
//! use tsframe::series::Series;
//!
//! let mut series = Series::new(128);
//! for i in 0..10u64 {
//!     series.append_value(i, i as f64).unwrap();
//! }
//!
//! let tx = TxSeries::new(&series);
//! let result = OpSum::new(0.0, 2).apply(&tx);
//! let values = result.values().unwrap();
//! assert_eq!(values.value_at(0), 1.0); // 0 + 1
//! assert_eq!(values.time_at(1), 2);
//! ```
//!
//! Everything is single-threaded per instance: no internal synchronization
//! is provided, and distinct instances can be used from distinct threads
//! without coordination.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod frame;
pub mod ops;
pub mod series;
pub mod types;

pub use codec::{Chimp, Gorilla, PackDescriptor, PackOp, Packer};
pub use error::{CodecError, Error, FrameError, OpError, Result, SeriesError};
pub use frame::{Frame, FrameState};
pub use series::Series;
pub use types::Number;
