//! Gorilla XOR codec
//!
//! The streaming float compression scheme from Facebook's in-memory TSDB.
//! Each value is XORed against the previous one; a zero XOR costs a single
//! bit, and a nonzero XOR is sent either inside the previously established
//! leading/trailing-zero window (control bit 0) or with a freshly encoded
//! window (control bit 1, 5-bit leading-zero count, 6-bit significant-bit
//! count).
//!
//! Ref: Pelkonen et al. "Gorilla: A Fast, Scalable, In-Memory Time Series
//! Database". PVLDB 8(12), 2015.

use std::marker::PhantomData;

use tracing::trace;

use super::bit_stream::{BitReader, BitWriter};
use super::{apply_pack_op, rotate_small_ints, undo_pack_op, PackDescriptor, PackOp, Packer};
use crate::error::CodecError;
use crate::types::Number;

/// Leading-zero counts at or above this are clamped to fit the 5-bit field.
const MAX_LEADING_ZEROS: u32 = 31;

/// Sentinel meaning "no window established yet"; compares greater than any
/// real leading-zero count so the first nonzero XOR always writes a window.
const NO_WINDOW: u32 = u32::MAX;

/// Gorilla codec for one run of packed values
///
/// See the [`Packer`] contract for the pack/unpack lifecycle; the instance
/// records `num_elements` during `pack` and replays exactly that many
/// codewords during `unpack`.
pub struct Gorilla<T: Number> {
    stored_value: u64,
    stored_leading_zeros: u32,
    stored_trailing_zeros: u32,
    size_bits: u64,
    num_elements: u64,
    small_ints: bool,
    first: bool,
    _marker: PhantomData<T>,
}

impl<T: Number> Gorilla<T> {
    /// Create a codec with the small-ints rotation enabled
    pub fn new() -> Self {
        Self {
            stored_value: 0,
            stored_leading_zeros: NO_WINDOW,
            stored_trailing_zeros: 0,
            size_bits: 0,
            num_elements: 0,
            small_ints: true,
            first: true,
            _marker: PhantomData,
        }
    }

    /// Create a codec with an explicit small-ints setting
    pub fn with_small_ints(small_ints: bool) -> Self {
        Self {
            small_ints,
            ..Self::new()
        }
    }

    /// Re-attach a codec to a persisted buffer of `num_elements` values
    ///
    /// The wire format is headerless; this is how a caller that persisted
    /// the element count out-of-band restores a codec able to unpack the
    /// buffer.
    pub fn with_num_elements(num_elements: u64) -> Self {
        Self {
            num_elements,
            ..Self::new()
        }
    }

    /// Restore a codec from persisted out-of-band metadata
    pub fn from_descriptor(desc: &PackDescriptor<T>) -> Self {
        Self {
            num_elements: desc.num_elements,
            small_ints: desc.small_ints,
            ..Self::new()
        }
    }

    /// Bundle the recorded state with the pack-time transform for persistence
    pub fn descriptor(&self, op: PackOp, op_param: T) -> PackDescriptor<T> {
        PackDescriptor {
            num_elements: self.num_elements,
            small_ints: self.small_ints,
            op,
            op_param,
        }
    }

    fn reset_encode(&mut self) {
        self.stored_value = 0;
        self.stored_leading_zeros = NO_WINDOW;
        self.stored_trailing_zeros = 0;
        self.size_bits = 0;
        self.num_elements = 0;
        self.first = true;
    }

    // num_elements and size_bits survive decode; they describe the packed
    // run and keep driving Length()/Size() on a materialized frame.
    fn reset_decode(&mut self) {
        self.stored_value = 0;
        self.stored_leading_zeros = NO_WINDOW;
        self.stored_trailing_zeros = 0;
        self.first = true;
    }

    fn encode_word(&mut self, writer: &mut BitWriter, value: u64) {
        if self.first {
            self.first = false;
            writer.write_bits(value, 64);
            self.size_bits += 64;
            self.stored_value = value;
            return;
        }

        let xor = self.stored_value ^ value;
        if xor == 0 {
            writer.write_bit(false);
            self.size_bits += 1;
        } else {
            writer.write_bit(true);
            let leading = xor.leading_zeros().min(MAX_LEADING_ZEROS);
            let trailing = xor.trailing_zeros();

            if leading >= self.stored_leading_zeros && trailing >= self.stored_trailing_zeros {
                // Previous window still covers the significant bits.
                writer.write_bit(false);
                let significant = 64 - self.stored_leading_zeros - self.stored_trailing_zeros;
                writer.write_bits(xor >> self.stored_trailing_zeros, significant as u8);
                self.size_bits += 2 + u64::from(significant);
            } else {
                writer.write_bit(true);
                writer.write_bits(u64::from(leading), 5);
                let significant = 64 - leading - trailing;
                // A 64-bit payload is encoded as 0 in the 6-bit count field.
                writer.write_bits(u64::from(significant) & 0x3F, 6);
                writer.write_bits(xor >> trailing, significant as u8);
                self.size_bits += 13 + u64::from(significant);
                self.stored_leading_zeros = leading;
                self.stored_trailing_zeros = trailing;
            }
        }
        self.stored_value = value;
    }

    fn decode_word(&mut self, reader: &mut BitReader<'_>) -> Result<u64, CodecError> {
        if self.first {
            self.first = false;
            self.stored_value = reader.read_bits(64)?;
            return Ok(self.stored_value);
        }

        if !reader.read_bit()? {
            return Ok(self.stored_value);
        }

        if !reader.read_bit()? {
            let significant = 64u32
                .saturating_sub(self.stored_leading_zeros)
                .saturating_sub(self.stored_trailing_zeros);
            let bits = reader.read_bits(significant as u8)?;
            self.stored_value ^= bits << self.stored_trailing_zeros;
        } else {
            let leading = reader.read_bits(5)? as u32;
            let mut significant = reader.read_bits(6)? as u32;
            if significant == 0 {
                significant = 64;
            }
            let trailing = 64u32.saturating_sub(significant).saturating_sub(leading);
            let bits = reader.read_bits(significant as u8)?;
            self.stored_leading_zeros = leading;
            self.stored_trailing_zeros = trailing;
            self.stored_value ^= bits << trailing;
        }
        Ok(self.stored_value)
    }
}

impl<T: Number> Default for Gorilla<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Number> Packer<T> for Gorilla<T> {
    fn pack(
        &mut self,
        src: &[T],
        dst: &mut Vec<u8>,
        op: PackOp,
        mut op_param: T,
    ) -> Result<(), CodecError> {
        self.reset_encode();
        let mut writer = BitWriter::with_capacity(src.len());

        if T::SIGNED {
            for value in src {
                writer.write_bit(value.is_negative());
            }
            self.size_bits += src.len() as u64;
        }

        for &value in src {
            let value = if T::SIGNED { value.abs_wrapping() } else { value };
            let transformed = apply_pack_op(value, op, &mut op_param);
            let mut word = transformed.to_word();
            if !T::FLOAT && self.small_ints {
                word = rotate_small_ints(word);
            }
            self.encode_word(&mut writer, word);
            self.num_elements += 1;
        }

        *dst = writer.finish(false);
        trace!(
            elements = self.num_elements,
            bits = self.size_bits,
            "gorilla pack complete"
        );
        Ok(())
    }

    fn unpack(
        &mut self,
        src: &[u8],
        dst: &mut Vec<T>,
        op: PackOp,
        mut op_param: T,
    ) -> Result<u64, CodecError> {
        self.reset_decode();
        let count = self.num_elements as usize;
        dst.clear();
        dst.reserve(count);

        let mut reader = BitReader::new(src);

        let mut signs = Vec::new();
        if T::SIGNED {
            signs.reserve(count);
            for _ in 0..count {
                signs.push(reader.read_bit()?);
            }
        }

        for index in 0..count {
            let mut word = self.decode_word(&mut reader)?;
            if !T::FLOAT && self.small_ints {
                word = rotate_small_ints(word);
            }
            let mut value = undo_pack_op(T::from_word(word), op, &mut op_param);
            if T::SIGNED && signs[index] {
                value = value.wrapping_neg();
            }
            dst.push(value);
        }

        trace!(elements = count, "gorilla unpack complete");
        Ok(count as u64)
    }

    fn packed_size(&self) -> u64 {
        (self.size_bits + 7) / 8
    }

    fn num_elements(&self) -> u64 {
        self.num_elements
    }
}
