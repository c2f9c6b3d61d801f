//! CodecWriter / CodecReader - 字节缓冲区读写原语
//!
//! 所有多字节整数都需要显式指定字节序：键和数据项（datum）使用大端序，
//! 新行格式（v2）的头部和紧凑整数使用小端序。

use super::error::{CodecError, CodecResult};

#[derive(Debug, Default, Clone)]
pub struct CodecWriter {
    buffer: Vec<u8>,
}

impl CodecWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_u16_be(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64_be(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// LEB128 无符号变长整数
    pub fn write_uvarint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buffer.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    /// zig-zag 编码后的有符号变长整数
    pub fn write_varint(&mut self, value: i64) {
        let mut ux = (value as u64) << 1;
        if value < 0 {
            ux = !ux;
        }
        self.write_uvarint(ux);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

#[derive(Debug, Clone)]
pub struct CodecReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CodecReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn peek_u8(&self) -> CodecResult<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| CodecError::corrupt("unexpected end of data"))
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                CodecError::corrupt(format!(
                    "need {} bytes at offset {}, only {} left",
                    len,
                    self.pos,
                    self.data.len() - self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        bytes
            .try_into()
            .map_err(|_| CodecError::corrupt(format!("failed to read {} bytes", N)))
    }

    pub fn read_u16_be(&mut self) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u16_le(&mut self) -> CodecResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> CodecResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_be(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_i64_be(&mut self) -> CodecResult<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_uvarint(&mut self) -> CodecResult<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && b > 1 {
                return Err(CodecError::corrupt("varint overflows a 64-bit integer"));
            }
            value |= u64::from(b & 0x7f) << shift;
            if b < 0x80 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(CodecError::corrupt("varint overflows a 64-bit integer"));
            }
        }
    }

    pub fn read_varint(&mut self) -> CodecResult<i64> {
        let ux = self.read_uvarint()?;
        let mut x = (ux >> 1) as i64;
        if ux & 1 != 0 {
            x = !x;
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_byte_order() {
        let mut w = CodecWriter::new();
        w.write_u16_be(0x0102);
        w.write_u16_le(0x0102);
        w.write_u32_le(0x01020304);
        assert_eq!(w.as_slice(), &[0x01, 0x02, 0x02, 0x01, 0x04, 0x03, 0x02, 0x01]);

        let mut r = CodecReader::new(w.as_slice());
        assert_eq!(r.read_u16_be().unwrap(), 0x0102);
        assert_eq!(r.read_u16_le().unwrap(), 0x0102);
        assert_eq!(r.read_u32_le().unwrap(), 0x01020304);
        assert!(r.eof());
    }

    #[test]
    fn test_varint_known_bytes() {
        let mut w = CodecWriter::new();
        w.write_uvarint(300);
        assert_eq!(w.as_slice(), &[0xac, 0x02]);

        let mut w = CodecWriter::new();
        w.write_varint(-1);
        w.write_varint(1);
        w.write_varint(-65);
        assert_eq!(w.as_slice(), &[0x01, 0x02, 0x81, 0x01]);

        let mut r = CodecReader::new(w.as_slice());
        assert_eq!(r.read_varint().unwrap(), -1);
        assert_eq!(r.read_varint().unwrap(), 1);
        assert_eq!(r.read_varint().unwrap(), -65);
    }

    #[test]
    fn test_varint_extremes() {
        for v in [i64::MIN, i64::MAX, 0] {
            let mut w = CodecWriter::new();
            w.write_varint(v);
            assert_eq!(CodecReader::new(w.as_slice()).read_varint().unwrap(), v);
        }
        let mut w = CodecWriter::new();
        w.write_uvarint(u64::MAX);
        assert_eq!(w.len(), 10);
        assert_eq!(CodecReader::new(w.as_slice()).read_uvarint().unwrap(), u64::MAX);
    }

    #[test]
    fn test_truncated_reads_are_corrupt() {
        let mut r = CodecReader::new(&[0x01, 0x02]);
        assert!(matches!(r.read_u64_be(), Err(CodecError::ValueCorrupt(_))));

        let mut r = CodecReader::new(&[0x80, 0x80]);
        assert!(matches!(r.read_uvarint(), Err(CodecError::ValueCorrupt(_))));
    }
}
