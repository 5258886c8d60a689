//! Dual-state frame container
//!
//! A [`Frame`] owns one contiguous run of values in either native form
//! (a `Vec<T>`), packed form (the codec's byte buffer), or both. Reads
//! transparently materialize the native form; mutation always goes through
//! the native form and marks the frame dirty; [`Frame::finalize`] re-packs
//! and can release the native vector afterwards.
//!
//! Materialization is a cache fill, so element reads take `&self` and the
//! native cache lives behind a `RefCell`. Frames are single-threaded
//! (`!Sync`), matching the rest of the crate; distinct frames can live on
//! distinct threads.
//!
//! # Example
//!
//! ```
//! use tsframe::codec::Chimp;
//! use tsframe::frame::Frame;
//!
//! let mut frame = Frame::empty(4, Box::new(Chimp::new()));
//! for i in 0..4 {
//!     frame.set_value(i, i as f64).unwrap();
//! }
//! assert!(frame.buffer().is_none()); // dirty: not packed yet
//!
//! frame.finalize(true).unwrap();     // pack and drop the native vector
//! assert!(frame.buffer().is_some());
//! assert_eq!(frame.value(2).unwrap(), 2.0); // re-materializes on demand
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::mem;

use tracing::{debug, trace};

use crate::codec::{PackOp, Packer};
use crate::error::FrameError;
use crate::types::Number;

/// Which representations a frame currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No representation; every operation fails `Uninitialized`
    Unknown,
    /// The native vector is authoritative
    Native,
    /// Only the packed buffer holds the data
    Compact,
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::Unknown => write!(f, "Unknown"),
            FrameState::Native => write!(f, "Native"),
            FrameState::Compact => write!(f, "Compact"),
        }
    }
}

/// The lazily materialized side of a frame: native cache plus the codec,
/// which is itself stateful across pack/unpack calls.
struct FrameCore<T: Number> {
    state: FrameState,
    values: Option<Vec<T>>,
    packer: Box<dyn Packer<T>>,
}

/// A fixed-capacity container for one run of values, switchable between
/// compressed-byte and native-array form
pub struct Frame<T: Number> {
    core: RefCell<FrameCore<T>>,
    buffer: Option<Vec<u8>>,
    pack_op: PackOp,
    pack_op_param: T,
    dirty: bool,
}

/// Unpack the buffer into a fresh native vector when the frame is compact.
fn materialize_core<T: Number>(
    buffer: Option<&[u8]>,
    pack_op: PackOp,
    pack_op_param: T,
    core: &mut FrameCore<T>,
) -> Result<(), FrameError> {
    if core.state != FrameState::Compact {
        return Ok(());
    }
    let src = buffer.unwrap_or(&[]);
    let mut values = Vec::new();
    core.packer.unpack(src, &mut values, pack_op, pack_op_param)?;
    trace!(elements = values.len(), "materialized frame");
    core.values = Some(values);
    core.state = FrameState::Native;
    Ok(())
}

impl<T: Number> Frame<T> {
    /// Create a frame with capacity for `capacity` elements, all zero
    ///
    /// The frame starts dirty: nothing has been packed yet.
    pub fn empty(capacity: usize, packer: Box<dyn Packer<T>>) -> Self {
        Self {
            core: RefCell::new(FrameCore {
                state: FrameState::Native,
                values: Some(vec![T::ZERO; capacity]),
                packer,
            }),
            buffer: None,
            pack_op: PackOp::Nop,
            pack_op_param: T::ZERO,
            dirty: true,
        }
    }

    /// Create a frame over an existing native vector
    pub fn from_values(values: Vec<T>, packer: Box<dyn Packer<T>>) -> Self {
        Self {
            core: RefCell::new(FrameCore {
                state: FrameState::Native,
                values: Some(values),
                packer,
            }),
            buffer: None,
            pack_op: PackOp::Nop,
            pack_op_param: T::ZERO,
            dirty: true,
        }
    }

    /// Create a frame over an existing packed buffer
    ///
    /// The packer must be the instance that produced the buffer, or one
    /// restored from its persisted descriptor: its recorded element count
    /// is what drives materialization. A freshly loaded packed frame is
    /// clean, so [`Frame::buffer`] works on it immediately.
    pub fn from_packed(buffer: Vec<u8>, packer: Box<dyn Packer<T>>) -> Self {
        Self {
            core: RefCell::new(FrameCore {
                state: FrameState::Compact,
                values: None,
                packer,
            }),
            buffer: Some(buffer),
            pack_op: PackOp::Nop,
            pack_op_param: T::ZERO,
            dirty: false,
        }
    }

    /// Configure the pre-transform used when packing and unpacking
    pub fn set_pack_op(&mut self, op: PackOp, op_param: T) {
        self.pack_op = op;
        self.pack_op_param = op_param;
    }

    /// Return the value at `index`, materializing the native form if needed
    pub fn value(&self, index: usize) -> Result<T, FrameError> {
        let mut core = self.core.borrow_mut();
        if core.state == FrameState::Unknown {
            return Err(FrameError::Uninitialized);
        }
        let len = frame_len(&core);
        if index >= len {
            return Err(FrameError::IndexOutOfRange { index, len });
        }
        materialize_core(self.buffer.as_deref(), self.pack_op, self.pack_op_param, &mut core)?;
        match &core.values {
            Some(values) => Ok(values[index]),
            None => Err(FrameError::Uninitialized),
        }
    }

    /// Overwrite the value at `index` and mark the frame dirty
    ///
    /// `index` is bounded by the configured capacity (the native length, or
    /// the recorded element count when compact).
    pub fn set_value(&mut self, index: usize, value: T) -> Result<(), FrameError> {
        let core = self.core.get_mut();
        if core.state == FrameState::Unknown {
            return Err(FrameError::Uninitialized);
        }
        let len = frame_len(core);
        if index >= len {
            return Err(FrameError::IndexOutOfRange { index, len });
        }
        materialize_core(self.buffer.as_deref(), self.pack_op, self.pack_op_param, core)?;
        if let Some(values) = core.values.as_mut() {
            values[index] = value;
        }
        self.dirty = true;
        Ok(())
    }

    /// Pack the frame if dirty; release the native vector when `reduce`
    ///
    /// After a successful `finalize(true)` the frame is compact and holds
    /// only the packed buffer.
    pub fn finalize(&mut self, reduce: bool) -> Result<(), FrameError> {
        if !self.dirty {
            if reduce {
                let core = self.core.get_mut();
                core.values = None;
                if self.buffer.is_some() {
                    core.state = FrameState::Compact;
                }
            }
            return Ok(());
        }

        let FrameCore {
            state,
            values,
            packer,
        } = self.core.get_mut();
        if *state == FrameState::Unknown {
            return Err(FrameError::Uninitialized);
        }
        let native = values.as_ref().ok_or(FrameError::Uninitialized)?;
        let buffer = self.buffer.get_or_insert_with(Vec::new);
        packer.pack(native, buffer, self.pack_op, self.pack_op_param)?;
        debug!(
            elements = native.len(),
            bytes = buffer.len(),
            "finalized frame"
        );
        *state = FrameState::Compact;
        if reduce {
            *values = None;
        }
        self.dirty = false;
        Ok(())
    }

    /// The packed bytes, available only while the frame is clean
    pub fn buffer(&self) -> Option<&[u8]> {
        if self.dirty {
            None
        } else {
            self.buffer.as_deref()
        }
    }

    /// Borrow the native values, materializing them if needed
    pub fn values(&self) -> Result<Ref<'_, [T]>, FrameError> {
        {
            let mut core = self.core.borrow_mut();
            if core.state == FrameState::Unknown {
                return Err(FrameError::Uninitialized);
            }
            materialize_core(self.buffer.as_deref(), self.pack_op, self.pack_op_param, &mut core)?;
        }
        Ref::filter_map(self.core.borrow(), |core| core.values.as_deref())
            .map_err(|_| FrameError::Uninitialized)
    }

    /// Number of elements: the native length, or the codec's recorded
    /// element count when compact
    pub fn length(&self) -> u64 {
        let core = self.core.borrow();
        match core.state {
            FrameState::Compact => core.packer.num_elements(),
            FrameState::Native => core.values.as_ref().map_or(0, Vec::len) as u64,
            FrameState::Unknown => 0,
        }
    }

    /// Memory footprint: packed byte count, plus the native vector while it
    /// is retained
    pub fn size(&self) -> u64 {
        let core = self.core.borrow();
        let native = core.values.as_ref().map_or(0, Vec::len) as u64;
        core.packer.packed_size() + native * mem::size_of::<T>() as u64
    }

    /// Current representation state
    pub fn state(&self) -> FrameState {
        self.core.borrow().state
    }
}

fn frame_len<T: Number>(core: &FrameCore<T>) -> usize {
    match core.state {
        FrameState::Compact => core.packer.num_elements() as usize,
        _ => core.values.as_ref().map_or(0, Vec::len),
    }
}

/// An uninitialized frame; every accessor fails until it is replaced
impl<T: Number> Default for Frame<T> {
    fn default() -> Self {
        Self {
            core: RefCell::new(FrameCore {
                state: FrameState::Unknown,
                values: None,
                packer: Box::new(crate::codec::Chimp::new()),
            }),
            buffer: None,
            pack_op: PackOp::Nop,
            pack_op_param: T::ZERO,
            dirty: true,
        }
    }
}
