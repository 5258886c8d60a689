//! Windowed minimum and maximum reductions

use super::{MaybeOp, Op, OpResult, Transformable, TxIdentity};
use crate::error::OpError;
use crate::types::Number;

/// Windowed minimum: one result per full window, strict `<` comparison with
/// the earliest extremum winning ties
pub struct OpMin<T: Number> {
    window: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Number> OpMin<T> {
    /// Create a minimum operator over windows of `window` elements
    pub fn new<'a>(window: usize) -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self {
            window,
            _marker: std::marker::PhantomData,
        }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpMin<T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        windowed_extremum(args, self.window, |candidate, best| candidate < best)
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

/// Windowed maximum: one result per full window, strict `>` comparison with
/// the earliest extremum winning ties
pub struct OpMax<T: Number> {
    window: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Number> OpMax<T> {
    /// Create a maximum operator over windows of `window` elements
    pub fn new<'a>(window: usize) -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self {
            window,
            _marker: std::marker::PhantomData,
        }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpMax<T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        windowed_extremum(args, self.window, |candidate, best| candidate > best)
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

fn windowed_extremum<'a, T: Number>(
    args: &'a dyn Transformable<T>,
    window: usize,
    replaces: impl Fn(T, T) -> bool,
) -> MaybeOp<'a, T> {
    if args.is_empty() {
        return MaybeOp::from_error(OpError::EmptyInput);
    }
    let len = args.len();
    let result_size = if window == 0 { 0 } else { len / window };
    if result_size == 0 {
        return MaybeOp::from_error(OpError::WindowTooLarge { len, window });
    }

    let mut values = Vec::with_capacity(result_size);
    let mut times = Vec::with_capacity(result_size);
    for window_index in 0..result_size {
        let start = window_index * window;
        let mut best = args.value_at(start);
        for offset in 1..window {
            let candidate = args.value_at(start + offset);
            if replaces(candidate, best) {
                best = candidate;
            }
        }
        values.push(best);
        times.push(args.time_at(start));
    }

    MaybeOp::just(Box::new(OpResult::with_times(values, times)))
}
