//! Bit-level access to the Huffman payload
//!
//! The reader is random-access: callers own the cursor and ask for single
//! bits by absolute index. The writer only appends.

use crate::config::BitOrder;
use crate::error::{Error, Result};

/// Mask selecting bit `index` inside its byte.
#[inline]
fn bit_mask(index: usize, order: BitOrder) -> u8 {
    let shift = (index % 8) as u8;
    match order {
        BitOrder::MsbFirst => 0x80 >> shift,
        BitOrder::LsbFirst => 0x01 << shift,
    }
}

/// Random-access bit reader over a byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct BitReader<'a> {
    data: &'a [u8],
    order: BitOrder,
}

impl<'a> BitReader<'a> {
    /// Reader taking the most significant bit of each byte first.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, BitOrder::MsbFirst)
    }

    #[must_use]
    pub fn with_order(data: &'a [u8], order: BitOrder) -> Self {
        Self { data, order }
    }

    /// Number of readable bits
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the bit at absolute index `index`
    ///
    /// # Errors
    /// Returns [`Error::BitIndexOutOfRange`] if `index >= self.len()`.
    pub fn read_bit(&self, index: usize) -> Result<bool> {
        let byte = self
            .data
            .get(index / 8)
            .ok_or(Error::BitIndexOutOfRange {
                index,
                len: self.len(),
            })?;
        Ok(byte & bit_mask(index, self.order) != 0)
    }
}

/// Bits packed into bytes, with the exact number of meaningful bits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedBits {
    pub bytes: Vec<u8>,
    pub bit_len: usize,
}

impl EncodedBits {
    /// Payload length in whole bytes (`ceil(bit_len / 8)`)
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bit_len.div_ceil(8)
    }
}

/// Append-only bit accumulator.
#[derive(Debug, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
    order: BitOrder,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(BitOrder::MsbFirst)
    }

    #[must_use]
    pub fn with_order(order: BitOrder) -> Self {
        Self {
            bytes: Vec::new(),
            bit_len: 0,
            order,
        }
    }

    /// Number of bits written so far
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= bit_mask(self.bit_len, self.order);
        }
        self.bit_len += 1;
    }

    pub fn write_bits(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.write_bit(bit);
        }
    }

    /// Finish writing. The last partial byte is already zero-padded.
    #[must_use]
    pub fn flush(self) -> EncodedBits {
        EncodedBits {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}
