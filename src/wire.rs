//! Primitive wire codec: little-endian field access over byte buffers
//!
//! Every multi-byte integer and float in an ADF buffer is little-endian,
//! regardless of host byte order. `Reader` fails closed: any read past the
//! end of the input returns [`Truncated`] instead of guessing.

/// Initial value for all CRC-16 computations.
pub const CRC_INIT: u16 = 0xFFFF;

/// Marker error for a read past the end of the input buffer.
///
/// Structural decoders map this onto the corruption code of the section
/// being decoded, so it intentionally carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated;

/// Sequential little-endian reader over a borrowed byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Truncated> {
        if self.remaining() < n {
            return Err(Truncated);
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, Truncated> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Truncated> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, Truncated> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, Truncated> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn read_f32(&mut self) -> Result<f32, Truncated> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// CRC-16 over everything consumed since `start` (a prior
    /// [`Reader::position`] value).
    pub fn crc_since(&self, start: usize) -> u16 {
        crc16(CRC_INIT, &self.bytes[start..self.pos])
    }
}

/// Growable little-endian writer.
///
/// Callers size the buffer up front (container sizes are computed exactly
/// before marshalling), so writes never reallocate in practice.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            buf: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// CRC-16 over everything written since `start` (a prior
    /// [`Writer::len`] value).
    pub fn crc_since(&self, start: usize) -> u16 {
        crc16(CRC_INIT, &self.buf[start..])
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// CRC-16/CCITT-FALSE (poly 0x1021), seeded with `init`.
///
/// Each container section (header, metadata, every series) carries one of
/// these over its own bytes; a single flipped bit anywhere in a section is
/// reported as that section's corruption error.
pub fn crc16(init: u16, bytes: &[u8]) -> u16 {
    let mut crc = init;
    for &byte in bytes {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
