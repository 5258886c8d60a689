//! Frame-sharded append-only time/value store
//!
//! A [`Series`] keeps two parallel frame lists, one for timestamps and one
//! for values, appended in lockstep: the element at global index `i` lives
//! at slot `i % F` of frame `i / F`, where `F` is the configured frame
//! capacity. Both lists are backed by [`Chimp`] codecs.
//!
//! The series is append-only and in-order by convention. Timestamps are not
//! enforced to be monotonic, but the windowed operators stamp results with
//! window-start times and rely on the caller appending in time order.
//!
//! # Example
//!
//! ```
//! use tsframe::series::Series;
//!
//! let mut series = Series::new(128);
//! for i in 0..10u64 {
//!     series.append_value(i, i as f64 * 0.5).unwrap();
//! }
//! assert_eq!(series.value(4).unwrap(), (4, 2.0));
//! ```

use tracing::trace;

use crate::codec::Chimp;
use crate::error::SeriesError;
use crate::frame::Frame;
use crate::types::Number;

/// An ordered sequence of `(time, value)` pairs stored as paired frames
pub struct Series<T: Number> {
    /// Frames for timestamps
    time_frames: Vec<Frame<u64>>,
    /// Frames for values
    value_frames: Vec<Frame<T>>,
    /// Capacity of every frame
    frame_size: usize,
    /// Number of live elements
    size: usize,
    /// Write offset inside the tail frames
    last_frame_offset: usize,
}

impl<T: Number> Series<T> {
    /// Create a series whose frames hold `frame_size` elements each
    ///
    /// # Panics
    ///
    /// Panics if `frame_size` is zero.
    pub fn new(frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be nonzero");
        Self {
            time_frames: Vec::new(),
            value_frames: Vec::new(),
            frame_size,
            size: 0,
            last_frame_offset: 0,
        }
    }

    /// Append a `(time, value)` pair at the end of the series
    pub fn append_value(&mut self, time: u64, value: T) -> Result<(), SeriesError> {
        if self.time_frames.is_empty() {
            self.append_frame();
        }
        let frame_index = self.size / self.frame_size;
        if frame_index >= self.time_frames.len() {
            self.append_frame();
        }

        self.time_frames[frame_index].set_value(self.last_frame_offset, time)?;
        self.value_frames[frame_index].set_value(self.last_frame_offset, value)?;

        self.last_frame_offset += 1;
        self.size += 1;
        Ok(())
    }

    /// Overwrite the pair at `index`
    pub fn set_value(&mut self, index: usize, time: u64, value: T) -> Result<(), SeriesError> {
        if index >= self.size {
            return Err(SeriesError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        let frame_index = index / self.frame_size;
        let local_index = index % self.frame_size;
        self.time_frames[frame_index].set_value(local_index, time)?;
        self.value_frames[frame_index].set_value(local_index, value)?;
        Ok(())
    }

    /// Return the `(time, value)` pair at `index`
    pub fn value(&self, index: usize) -> Result<(u64, T), SeriesError> {
        if index >= self.size {
            return Err(SeriesError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        let frame_index = index / self.frame_size;
        let local_index = index % self.frame_size;
        let time = self.time_frames[frame_index].value(local_index)?;
        let value = self.value_frames[frame_index].value(local_index)?;
        Ok((time, value))
    }

    /// Number of live elements
    pub fn size(&self) -> usize {
        self.size
    }

    /// Configured per-frame capacity
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn append_frame(&mut self) {
        trace!(
            frame = self.time_frames.len(),
            capacity = self.frame_size,
            "appending series frame pair"
        );
        self.time_frames
            .push(Frame::empty(self.frame_size, Box::new(Chimp::new())));
        self.value_frames
            .push(Frame::empty(self.frame_size, Box::new(Chimp::new())));
        self.last_frame_offset = 0;
    }
}
