//! Windowed and pairwise operators over transformable views
//!
//! Operators compose through [`MaybeOp`], a short-circuiting wrapper that
//! holds either a live operator or the first error of the chain. Each
//! `apply` consumes the wrapper and returns the next one, so a chain reads
//! fluently and an early error passes through every later `apply`
//! untouched:
//!
//! ```
//! use tsframe::ops::{OpAdd, TxIdentity};
//!
//! let a: Vec<f64> = (0..10).map(|i| i as f64).collect();
//! let tx_a = TxIdentity::new(&a);
//! let tx_b = TxIdentity::new(&a);
//!
//! let result = OpAdd::new().apply(&tx_a).apply(&tx_b);
//! assert!(result.error().is_none());
//! let values = result.values().unwrap();
//! assert_eq!(values.value_at(3), 6.0);
//! ```
//!
//! The binary operators ([`OpAdd`], [`OpMul`], [`OpMulAdd`]) are curried:
//! the first `apply` captures the left view, the second pairs it with the
//! right view. The windowed reductions ([`OpSum`], [`OpMin`], [`OpMax`],
//! [`OpPct`]) partition their input into non-overlapping windows from the
//! start, drop the trailing partial window, and stamp each result with the
//! time of the window's first element. Operators never mutate their input
//! views; results are materialized into fresh storage held by the final
//! operator.

mod add;
mod min_max;
mod mul;
mod mul_add;
mod pct;
mod sum;
mod transform;

pub use add::OpAdd;
pub use min_max::{OpMax, OpMin};
pub use mul::OpMul;
pub use mul_add::OpMulAdd;
pub use pct::OpPct;
pub use sum::OpSum;
pub use transform::{Transformable, TxConst, TxIdentity, TxNegate, TxSeries};

use crate::error::OpError;
use crate::types::Number;

/// A functional operator over transformable views
///
/// `apply` either produces a further curried operator or a final
/// [`OpResult`]; `values` yields the materialized result on a final
/// operator and `None` on a curried one.
pub trait Op<'a, T: Number> {
    /// Apply the operator to a view, producing the next step of the chain
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T>;

    /// The final values, if this operator carries them
    fn values(&self) -> Option<TxIdentity<'_, T>>;
}

/// An operator chain step: either a live operator or the chain's error
///
/// Modeled on the Maybe monad: applying an erroring `MaybeOp` returns it
/// unchanged, so the first error in a chain is also its last.
pub struct MaybeOp<'a, T: Number> {
    inner: Result<Box<dyn Op<'a, T> + 'a>, OpError>,
}

impl<'a, T: Number> MaybeOp<'a, T> {
    /// Wrap a live operator
    pub fn just(op: Box<dyn Op<'a, T> + 'a>) -> Self {
        Self { inner: Ok(op) }
    }

    /// Wrap an error; every later `apply` will return it untouched
    pub fn from_error(err: OpError) -> Self {
        Self { inner: Err(err) }
    }

    /// The chain's error, if any
    pub fn error(&self) -> Option<&OpError> {
        self.inner.as_ref().err()
    }

    /// Apply the wrapped operator to a view
    pub fn apply(self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        match self.inner {
            Ok(op) => op.apply(args),
            Err(err) => MaybeOp { inner: Err(err) },
        }
    }

    /// The materialized result, or `None` on an error or a curried operator
    pub fn values(&self) -> Option<TxIdentity<'_, T>> {
        match &self.inner {
            Ok(op) => op.values(),
            Err(_) => None,
        }
    }
}

/// Final operator of a chain, owning the materialized result
#[derive(Debug, Clone)]
pub struct OpResult<T: Number> {
    values: Vec<T>,
    times: Option<Vec<u64>>,
}

impl<T: Number> OpResult<T> {
    /// Result without a time plane
    pub(crate) fn new(values: Vec<T>) -> Self {
        Self {
            values,
            times: None,
        }
    }

    /// Result with a parallel time plane
    pub(crate) fn with_times(values: Vec<T>, times: Vec<u64>) -> Self {
        Self {
            values,
            times: Some(times),
        }
    }
}

impl<'a, T: Number> Op<'a, T> for OpResult<T> {
    /// A final result ignores further inputs and reproduces itself
    fn apply(&self, _args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(self.clone()))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        Some(match &self.times {
            Some(times) => TxIdentity::with_times(&self.values, times),
            None => TxIdentity::new(&self.values),
        })
    }
}
