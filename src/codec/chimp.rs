//! Chimp XOR codec
//!
//! The streaming variant of the Chimp algorithm. Compared with Gorilla it
//! spends a fixed 2-bit flag per value, encodes leading-zero counts through
//! a rounded 3-bit table instead of a raw 5-bit field, and only strips
//! trailing zeros when more than [`THRESHOLD`] of them are available.
//!
//! After a zero XOR or a trailing-zero codeword the stored leading-zero
//! count is set to the sentinel 65, deliberately forcing the next nonzero
//! value to re-establish its leading-zero count; this matches the paper's
//! streaming formulation.
//!
//! Ref: Panagiotis Liakos, Katia Papakonstantinopoulou, and Yannis Kotidis.
//! "Chimp: Efficient Lossless Floating Point Compression for Time Series
//! Databases". PVLDB 15(11): 3058-3070, 2022.

use std::marker::PhantomData;

use tracing::trace;

use super::bit_stream::{BitReader, BitWriter};
use super::{apply_pack_op, rotate_small_ints, undo_pack_op, PackDescriptor, PackOp, Packer};
use crate::error::CodecError;
use crate::types::Number;

/// Minimum trailing-zero count worth spending the 6-bit length field on
const THRESHOLD: u32 = 6;

/// Forces the `leading != stored_leading` branch on the next nonzero XOR
const LEADING_REFRESH: u32 = 65;

/// Rounds a leading-zero count down to one of {0, 8, 12, 16, 18, 20, 22, 24}
const LEADING_ROUND: [u32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, //
    8, 8, 8, 8, 12, 12, 12, 12, //
    16, 16, 18, 18, 20, 20, 22, 22, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24, //
    24, 24, 24, 24, 24, 24, 24, 24,
];

/// Maps a rounded leading-zero count to its 3-bit code
const LEADING_REPRESENTATION: [u64; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, //
    1, 1, 1, 1, 2, 2, 2, 2, //
    3, 3, 4, 4, 5, 5, 6, 6, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7,
];

/// Inverse of [`LEADING_REPRESENTATION`]
const LEADING_UNPACK: [u32; 8] = [0, 8, 12, 16, 18, 20, 22, 24];

/// Chimp codec for one run of packed values
///
/// See the [`Packer`] contract for the pack/unpack lifecycle. This is the
/// codec the [`Series`](crate::series::Series) uses for both its time and
/// value frames.
pub struct Chimp<T: Number> {
    stored_value: u64,
    stored_leading_zeros: u32,
    stored_trailing_zeros: u32,
    size_bits: u64,
    num_elements: u64,
    small_ints: bool,
    first: bool,
    _marker: PhantomData<T>,
}

impl<T: Number> Chimp<T> {
    /// Create a codec with the small-ints rotation enabled
    pub fn new() -> Self {
        Self {
            stored_value: 0,
            stored_leading_zeros: LEADING_REFRESH,
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
        self.stored_leading_zeros = LEADING_REFRESH;
        self.stored_trailing_zeros = 0;
        self.size_bits = 0;
        self.num_elements = 0;
        self.first = true;
    }

    // num_elements and size_bits survive decode; they describe the packed
    // run and keep driving Length()/Size() on a materialized frame.
    fn reset_decode(&mut self) {
        self.stored_value = 0;
        self.stored_leading_zeros = LEADING_REFRESH;
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
            writer.write_bits(0b00, 2);
            self.size_bits += 2;
            self.stored_leading_zeros = LEADING_REFRESH;
        } else {
            let leading = LEADING_ROUND[xor.leading_zeros() as usize];
            let trailing = xor.trailing_zeros();

            if trailing > THRESHOLD {
                let significant = 64 - leading - trailing;
                writer.write_bits(0b01, 2);
                writer.write_bits(LEADING_REPRESENTATION[leading as usize], 3);
                writer.write_bits(u64::from(significant), 6);
                writer.write_bits(xor >> trailing, significant as u8);
                self.size_bits += 11 + u64::from(significant);
                self.stored_leading_zeros = LEADING_REFRESH;
            } else if leading == self.stored_leading_zeros {
                let significant = 64 - leading;
                writer.write_bits(0b10, 2);
                writer.write_bits(xor, significant as u8);
                self.size_bits += 2 + u64::from(significant);
            } else {
                self.stored_leading_zeros = leading;
                let significant = 64 - leading;
                writer.write_bits(0b11, 2);
                writer.write_bits(LEADING_REPRESENTATION[leading as usize], 3);
                writer.write_bits(xor, significant as u8);
                self.size_bits += 5 + u64::from(significant);
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

        match reader.read_bits(2)? {
            0b00 => {}
            0b01 => {
                let code = reader.read_bits(3)? as usize;
                self.stored_leading_zeros = LEADING_UNPACK[code];
                let mut significant = reader.read_bits(6)? as u32;
                if significant == 0 {
                    significant = 64;
                }
                self.stored_trailing_zeros = 64u32
                    .saturating_sub(significant)
                    .saturating_sub(self.stored_leading_zeros);
                let payload = 64u32
                    .saturating_sub(self.stored_leading_zeros)
                    .saturating_sub(self.stored_trailing_zeros);
                let bits = reader.read_bits(payload as u8)?;
                self.stored_value ^= bits << self.stored_trailing_zeros;
            }
            0b10 => {
                let payload = 64u32.saturating_sub(self.stored_leading_zeros);
                let bits = reader.read_bits(payload as u8)?;
                self.stored_value ^= bits;
            }
            _ => {
                let code = reader.read_bits(3)? as usize;
                self.stored_leading_zeros = LEADING_UNPACK[code];
                let payload = 64u32.saturating_sub(self.stored_leading_zeros);
                let bits = reader.read_bits(payload as u8)?;
                self.stored_value ^= bits;
            }
        }
        Ok(self.stored_value)
    }
}

impl<T: Number> Default for Chimp<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Number> Packer<T> for Chimp<T> {
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
            "chimp pack complete"
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

        trace!(elements = count, "chimp unpack complete");
        Ok(count as u64)
    }

    fn packed_size(&self) -> u64 {
        (self.size_bits + 7) / 8
    }

    fn num_elements(&self) -> u64 {
        self.num_elements
    }
}
