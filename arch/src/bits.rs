use crate::error::Error;
use std::fmt;

/// Fixed-size bit sequence. Bit 0 is the least significant bit, bytes are
/// stored little-endian. Bits above `size` in the last byte are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitValue {
    bytes: Vec<u8>,
    size: usize,
}

fn byte_count(size: usize) -> usize {
    (size + 7) / 8
}

impl BitValue {
    /// All-zero value of `size` bits.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; byte_count(size)],
            size,
        }
    }

    pub fn from_u64(value: u64, size: usize) -> Self {
        let mut out = Self::new(size);
        for (i, byte) in out.bytes.iter_mut().enumerate().take(8) {
            *byte = (value >> (i * 8)) as u8;
        }
        out.mask_top();
        out
    }

    /// Two's complement; bits above 64 replicate the sign.
    pub fn from_i64(value: i64, size: usize) -> Self {
        let mut out = Self::from_u64(value as u64, size);
        if value < 0 {
            for byte in out.bytes.iter_mut().skip(8) {
                *byte = 0xFF;
            }
            out.mask_top();
        }
        out
    }

    pub fn from_bytes_le(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            size: bytes.len() * 8,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes_le(&self) -> &[u8] {
        &self.bytes
    }

    pub fn get(&self, index: usize) -> Result<bool, Error> {
        if index >= self.size {
            return Err(Error::BitIndex(index, self.size));
        }
        Ok(self.bytes[index / 8] & (1 << (index % 8)) != 0)
    }

    pub fn set(&mut self, index: usize, bit: bool) -> Result<(), Error> {
        if index >= self.size {
            return Err(Error::BitIndex(index, self.size));
        }
        let mask = 1 << (index % 8);
        if bit {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
        Ok(())
    }

    fn bit(&self, index: usize) -> bool {
        index < self.size && self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    fn mask_top(&mut self) {
        let rest = self.size % 8;
        if rest != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << rest) - 1;
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    pub fn sign_bit(&self) -> bool {
        self.size > 0 && self.bit(self.size - 1)
    }

    /// Lower 64 bits, zero-extended.
    pub fn to_u64(&self) -> u64 {
        self.bytes
            .iter()
            .take(8)
            .enumerate()
            .fold(0, |acc, (i, b)| acc | (*b as u64) << (i * 8))
    }

    /// Lower 64 bits, sign-extended from this value's own width.
    pub fn to_i64(&self) -> i64 {
        let raw = self.to_u64();
        if self.size == 0 || self.size >= 64 {
            return raw as i64;
        }
        let shift = 64 - self.size as u32;
        ((raw << shift) as i64) >> shift
    }

    pub fn zero_extend(&self, size: usize) -> Self {
        self.resize(size, false)
    }

    pub fn sign_extend(&self, size: usize) -> Self {
        self.resize(size, self.sign_bit())
    }

    /// Truncates or extends to `size`, filling new high bits with `fill`.
    pub fn resize(&self, size: usize, fill: bool) -> Self {
        let mut out = Self::new(size);
        for i in 0..size {
            let bit = if i < self.size { self.bit(i) } else { fill };
            if bit {
                out.bytes[i / 8] |= 1 << (i % 8);
            }
        }
        out
    }

    /// `len` bits starting at bit `offset`.
    pub fn sub(&self, offset: usize, len: usize) -> Result<Self, Error> {
        if offset + len > self.size {
            return Err(Error::BitIndex(offset + len, self.size));
        }
        let mut out = Self::new(len);
        for i in 0..len {
            if self.bit(offset + i) {
                out.bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Ok(out)
    }

    /// Overwrites the bits starting at `offset` with `other`.
    pub fn write(&mut self, other: &BitValue, offset: usize) -> Result<(), Error> {
        if offset + other.size > self.size {
            return Err(Error::BitIndex(offset + other.size, self.size));
        }
        for i in 0..other.size {
            self.set(offset + i, other.bit(i))?;
        }
        Ok(())
    }

    /// True when the value, read as two's complement, needs more than `bits`
    /// bits.
    pub fn occupies_more_bits_than(&self, bits: usize) -> bool {
        if bits == 0 {
            return !self.is_zero();
        }
        if bits >= self.size {
            return false;
        }
        let sign = self.bit(bits - 1);
        (bits..self.size).any(|i| self.bit(i) != sign)
    }

    /// True when the value, read as unsigned, needs more than `bits` bits.
    pub fn occupies_more_unsigned_bits_than(&self, bits: usize) -> bool {
        (bits..self.size).any(|i| self.bit(i))
    }
}

impl fmt::Display for BitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        if self.bytes.is_empty() {
            return write!(f, "0");
        }
        for byte in self.bytes.iter().rev() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
