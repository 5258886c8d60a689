//! Windowed sum reduction

use super::{MaybeOp, Op, OpResult, Transformable, TxIdentity};
use crate::error::OpError;
use crate::types::Number;

/// Windowed sum: one result per full window of `window` elements, each
/// stamped with the time of the window's first element
///
/// The initial value participates once, added to the first element of the
/// first window.
pub struct OpSum<T: Number> {
    initial: T,
    window: usize,
}

impl<T: Number> OpSum<T> {
    /// Create a sum operator over windows of `window` elements
    pub fn new<'a>(initial: T, window: usize) -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self { initial, window }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpSum<T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if args.is_empty() {
            return MaybeOp::from_error(OpError::EmptyInput);
        }
        let len = args.len();
        let result_size = if self.window == 0 {
            0
        } else {
            len / self.window
        };
        if result_size == 0 {
            return MaybeOp::from_error(OpError::WindowTooLarge {
                len,
                window: self.window,
            });
        }

        let mut values = Vec::with_capacity(result_size);
        let mut times = Vec::with_capacity(result_size);
        for window_index in 0..result_size {
            let start = window_index * self.window;
            let mut sum = args.value_at(start);
            if start == 0 {
                sum = sum.wrapping_add(self.initial);
            }
            for offset in 1..self.window {
                sum = sum.wrapping_add(args.value_at(start + offset));
            }
            values.push(sum);
            times.push(args.time_at(start));
        }

        MaybeOp::just(Box::new(OpResult::with_times(values, times)))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}
