//! Pairwise multiplication of two views

use std::marker::PhantomData;

use super::{MaybeOp, Op, OpResult, Transformable, TxIdentity};
use crate::error::OpError;
use crate::types::Number;

/// Curried element-wise multiplication: `apply` once to capture the left
/// view, a second time to multiply by the right view
pub struct OpMul<T: Number> {
    _marker: PhantomData<T>,
}

impl<T: Number> OpMul<T> {
    /// Create a multiplication operator ready to capture its first operand
    pub fn new<'a>() -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self {
            _marker: PhantomData,
        }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpMul<T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if args.is_empty() {
            return MaybeOp::from_error(OpError::EmptyInput);
        }
        MaybeOp::just(Box::new(OpMul1 { a: args }))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

/// Multiplication with the left operand captured
struct OpMul1<'a, T: Number> {
    a: &'a dyn Transformable<T>,
}

impl<'a, T: Number> Op<'a, T> for OpMul1<'a, T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if self.a.len() != args.len() {
            return MaybeOp::from_error(OpError::LengthMismatch {
                left: self.a.len(),
                right: args.len(),
            });
        }
        let values = (0..args.len())
            .map(|idx| self.a.value_at(idx).wrapping_mul(args.value_at(idx)))
            .collect();
        MaybeOp::just(Box::new(OpResult::new(values)))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}
