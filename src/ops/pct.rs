//! Windowed percentile reduction

use super::{MaybeOp, Op, OpResult, Transformable, TxIdentity};
use crate::error::OpError;
use crate::types::Number;

/// Windowed percentile over non-overlapping windows
///
/// For a window of `w` elements the `p`-th percentile (`p` in `[0, 100]`)
/// is the average of the `k`-th and `(k+1)`-th order statistics, where
/// `k = ⌊(w - 1) · p / 100⌋`. When `p == 0`, or when `k` already is the
/// last index, the two statistics coincide. Selection is done in place with
/// quickselect, so each window is copied into scratch storage first.
pub struct OpPct<T: Number> {
    window: usize,
    pct: f64,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Number> OpPct<T> {
    /// Create a percentile operator over windows of `window` elements
    pub fn new<'a>(window: usize, pct: f64) -> MaybeOp<'a, T> {
        MaybeOp::just(Box::new(Self {
            window,
            pct,
            _marker: std::marker::PhantomData,
        }))
    }
}

impl<'a, T: Number> Op<'a, T> for OpPct<T> {
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

        // Quickselect needs random-access, mutable storage; a view offers
        // neither, so the values are copied out once. Windows are disjoint
        // slices of the scratch vector, so per-window selection cannot leak
        // into a neighbour.
        let mut scratch: Vec<T> = (0..len).map(|idx| args.value_at(idx)).collect();

        let mut values = Vec::with_capacity(result_size);
        let mut times = Vec::with_capacity(result_size);
        for window_index in 0..result_size {
            let start = window_index * self.window;
            let window = &mut scratch[start..start + self.window];
            values.push(percentile(window, self.pct));
            times.push(args.time_at(start));
        }

        MaybeOp::just(Box::new(OpResult::with_times(values, times)))
    }

    fn values(&self) -> Option<TxIdentity<'_, T>> {
        None
    }
}

/// Average of the k-th and (k+1)-th order statistics of `data`
fn percentile<T: Number>(data: &mut [T], pct: f64) -> T {
    if data.is_empty() {
        return T::ZERO;
    }

    let k = ((data.len() - 1) as f64 * (pct / 100.0)) as usize;
    quickselect(data, k);
    let kth = data[k];

    // The next order statistic is the smallest element of the remainder;
    // when k is already last (or p == 0) it coincides with the k-th.
    let mut next = kth;
    if pct > 0.0 && k + 1 < data.len() {
        if k + 1 == data.len() - 1 {
            next = data[k + 1];
        } else {
            quickselect(&mut data[k + 1..], 1);
            next = data[k + 1];
        }
    }

    kth.wrapping_add(next).div2()
}

/// Partially sort `data` so that `data[k]` is its k-th order statistic
fn quickselect<T: Number>(data: &mut [T], k: usize) {
    let mut left = 0;
    let mut right = data.len() - 1;
    loop {
        let pivot = partition(data, left, right);
        match k.cmp(&pivot) {
            std::cmp::Ordering::Equal => return,
            std::cmp::Ordering::Less => right = pivot - 1,
            std::cmp::Ordering::Greater => left = pivot + 1,
        }
    }
}

/// Lomuto partition around the middle element of `[left, right]`
fn partition<T: Number>(data: &mut [T], left: usize, right: usize) -> usize {
    let pivot_index = left + (right - left) / 2;
    let pivot_value = data[pivot_index];
    data.swap(pivot_index, right);

    let mut boundary = left;
    for idx in left..right {
        if data[idx] < pivot_value {
            data.swap(boundary, idx);
            boundary += 1;
        }
    }
    data.swap(boundary, right);
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::TxSeries;
    use crate::series::Series;

    fn ramp_series(n: u64) -> Series<f64> {
        let mut series = Series::new(100);
        for i in 0..n {
            series.append_value(i, i as f64).unwrap();
        }
        series
    }

    #[test]
    fn test_pct_median_over_windows() {
        let series = ramp_series(100);
        let tx = TxSeries::new(&series);

        let res = OpPct::new(10, 50.0).apply(&tx);
        assert!(res.error().is_none());
        let values = res.values().unwrap();

        let expected = [4.5, 14.5, 24.5, 34.5, 44.5, 54.5, 64.5, 74.5, 84.5, 94.5];
        for (i, &e) in expected.iter().enumerate() {
            assert_eq!(values.value_at(i), e);
            assert_eq!(values.time_at(i), (i * 10) as u64);
        }
    }

    #[test]
    fn test_pct_single_element_window() {
        let mut series = Series::new(100);
        series.append_value(0, 1.5).unwrap();
        let tx = TxSeries::new(&series);

        let res = OpPct::new(1, 50.0).apply(&tx);
        assert!(res.error().is_none());
        let values = res.values().unwrap();
        assert_eq!(values.value_at(0), 1.5);
        assert_eq!(values.time_at(0), 0);
    }

    #[test]
    fn test_pct_all_percentiles() {
        let series = ramp_series(100);
        let tx = TxSeries::new(&series);

        for pct in 0..=100 {
            let res = OpPct::new(10, pct as f64).apply(&tx);
            assert!(res.error().is_none());
            let values = res.values().unwrap();

            let i1 = (9.0 * (pct as f64 / 100.0)) as usize;
            let i2 = if pct > 0 && i1 + 1 < 10 { i1 + 1 } else { i1 };
            let reference = (i1 as f64 + i2 as f64) / 2.0;

            for window in 0..10 {
                assert_eq!(
                    values.value_at(window),
                    (window * 10) as f64 + reference,
                    "pct {} window {}",
                    pct,
                    window
                );
                assert_eq!(values.time_at(window), (window * 10) as u64);
            }
        }
    }

    #[test]
    fn test_pct_unsorted_window() {
        let a = [9.0, 1.0, 8.0, 2.0, 7.0, 3.0, 6.0, 4.0, 5.0, 0.0];
        let tx = TxIdentity::new(&a);

        let res = OpPct::new(10, 50.0).apply(&tx);
        let values = res.values().unwrap();
        assert_eq!(values.value_at(0), 4.5);
    }

    #[test]
    fn test_pct_integer_truncation() {
        let a: Vec<i64> = (0..10).collect();
        let tx = TxIdentity::new(&a);

        let res = OpPct::new(10, 50.0).apply(&tx);
        let values = res.values().unwrap();
        // (4 + 5) / 2 truncates in the integer domain
        assert_eq!(values.value_at(0), 4);
    }

    #[test]
    fn test_pct_drops_partial_window() {
        let a: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let tx = TxIdentity::new(&a);

        let res = OpPct::new(10, 50.0).apply(&tx);
        let values = res.values().unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_pct_window_too_large() {
        let a = [1.0, 2.0];
        let tx = TxIdentity::new(&a);
        let res = OpPct::new(3, 50.0).apply(&tx);
        assert_eq!(
            res.error(),
            Some(&OpError::WindowTooLarge { len: 2, window: 3 })
        );
    }
}
