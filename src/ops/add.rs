//! Pairwise addition of two views

use std::marker::PhantomData;

use super::{MaybeOp, Op, OpResult, Transformable, TxIdentity};
use crate::error::OpError;
use crate::types::Number;

/// Curried element-wise addition: `apply` once to capture the left view,
/// a second time to add the right view to it
pub struct OpAdd<T: Number> {
    _marker: PhantomData<T>,
}

impl<T: Number> OpAdd<T> {
    /// Create an addition operator ready to capture its first operand
    pub fn new<'a>() -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self {
            _marker: PhantomData,
        }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpAdd<T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if args.is_empty() {
            return MaybeOp::from_error(OpError::EmptyInput);
        }
        MaybeOp::just(Box::new(OpAdd1 { a: args }))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

/// Addition with the left operand captured
struct OpAdd1<'a, T: Number> {
    a: &'a dyn Transformable<T>,
}

impl<'a, T: Number> Op<'a, T> for OpAdd1<'a, T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if self.a.len() != args.len() {
            return MaybeOp::from_error(OpError::LengthMismatch {
                left: self.a.len(),
                right: args.len(),
            });
        }
        let values = (0..args.len())
            .map(|idx| self.a.value_at(idx).wrapping_add(args.value_at(idx)))
            .collect();
        MaybeOp::just(Box::new(OpResult::new(values)))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_basic() {
        let a: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let tx_a = TxIdentity::new(&a);
        let tx_b = TxIdentity::new(&a);

        let res = OpAdd::new().apply(&tx_a).apply(&tx_b);
        assert!(res.error().is_none());
        let values = res.values().unwrap();
        for i in 0..10 {
            assert_eq!(values.value_at(i), 2.0 * i as f64);
        }
        // Pairwise results carry no time plane
        assert_eq!(values.time_at(0), 0);
    }

    #[test]
    fn test_add_commutes() {
        let a = [1.0, -2.5, 3.0];
        let b = [0.5, 4.0, -1.0];
        let (tx_a1, tx_b1) = (TxIdentity::new(&a), TxIdentity::new(&b));
        let (tx_a2, tx_b2) = (TxIdentity::new(&a), TxIdentity::new(&b));

        let ab = OpAdd::new().apply(&tx_a1).apply(&tx_b1);
        let ba = OpAdd::new().apply(&tx_b2).apply(&tx_a2);
        for i in 0..3 {
            assert_eq!(
                ab.values().unwrap().value_at(i),
                ba.values().unwrap().value_at(i)
            );
        }
    }

    #[test]
    fn test_add_length_mismatch() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.0];
        let tx_a = TxIdentity::new(&a);
        let tx_b = TxIdentity::new(&b);

        let res = OpAdd::new().apply(&tx_a).apply(&tx_b);
        assert_eq!(
            res.error(),
            Some(&OpError::LengthMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn test_add_empty_input() {
        let empty: [i64; 0] = [];
        let tx = TxIdentity::new(&empty);
        let res = OpAdd::new().apply(&tx);
        assert_eq!(res.error(), Some(&OpError::EmptyInput));
    }
}
