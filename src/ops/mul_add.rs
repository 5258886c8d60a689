//! Fused multiply-add of two views with a constant factor

use super::{MaybeOp, Op, OpResult, Transformable, TxIdentity};
use crate::error::OpError;
use crate::types::Number;

/// Curried `c * a[i] + b[i]`: `apply` once to capture `a`, a second time to
/// supply `b`
pub struct OpMulAdd<T: Number> {
    c: T,
}

impl<T: Number> OpMulAdd<T> {
    /// Create a multiply-add operator with factor `c`
    pub fn new<'a>(c: T) -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self { c }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpMulAdd<T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if args.is_empty() {
            return MaybeOp::from_error(OpError::EmptyInput);
        }
        MaybeOp::just(Box::new(OpMulAdd1 {
            c: self.c,
            a: args,
        }))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

/// Multiply-add with the scaled operand captured
struct OpMulAdd1<'a, T: Number> {
    c: T,
    a: &'a dyn Transformable<T>,
}

impl<'a, T: Number> Op<'a, T> for OpMulAdd1<'a, T> {
    fn apply(&self, args: &'a dyn Transformable<T>) -> MaybeOp<'a, T> {
        if self.a.len() != args.len() {
            return MaybeOp::from_error(OpError::LengthMismatch {
                left: self.a.len(),
                right: args.len(),
            });
        }
        let values = (0..args.len())
            .map(|idx| {
                self.c
                    .wrapping_mul(self.a.value_at(idx))
                    .wrapping_add(args.value_at(idx))
            })
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
    use crate::ops::TxNegate;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_mul_add_basic() {
        let a = ramp(10);
        let b = ramp(10);
        let tx_a = TxIdentity::new(&a);
        let tx_b = TxIdentity::new(&b);

        let res = OpMulAdd::new(2.0).apply(&tx_a).apply(&tx_b);
        assert!(res.error().is_none());
        let values = res.values().unwrap();
        for i in 0..10 {
            assert_eq!(values.value_at(i), 2.0 * a[i] + b[i]);
        }
    }

    #[test]
    fn test_mul_add_negated_first_operand() {
        let a = ramp(10);
        let b = ramp(10);
        let tx_a = TxNegate::new(&a);
        let tx_b = TxIdentity::new(&b);

        let res = OpMulAdd::new(2.0).apply(&tx_a).apply(&tx_b);
        let values = res.values().unwrap();
        for i in 0..10 {
            assert_eq!(values.value_at(i), 2.0 * -a[i] + b[i]);
        }
    }

    #[test]
    fn test_mul_add_negated_second_operand() {
        let a = ramp(10);
        let b = ramp(10);
        let tx_a = TxIdentity::new(&a);
        let tx_b = TxNegate::new(&b);

        let res = OpMulAdd::new(2.0).apply(&tx_a).apply(&tx_b);
        let values = res.values().unwrap();
        for i in 0..10 {
            assert_eq!(values.value_at(i), 2.0 * a[i] - b[i]);
        }
    }

    #[test]
    fn test_mul_add_both_negated() {
        let a = ramp(10);
        let b = ramp(10);
        let tx_a = TxNegate::new(&a);
        let tx_b = TxNegate::new(&b);

        let res = OpMulAdd::new(2.0).apply(&tx_a).apply(&tx_b);
        let values = res.values().unwrap();
        for i in 0..10 {
            assert_eq!(values.value_at(i), 2.0 * -a[i] - b[i]);
        }
    }

    #[test]
    fn test_mul_add_empty_input() {
        let empty: [f64; 0] = [];
        let tx = TxIdentity::new(&empty);
        let res = OpMulAdd::new(2.0).apply(&tx);
        assert_eq!(res.error(), Some(&OpError::EmptyInput));
    }
}
