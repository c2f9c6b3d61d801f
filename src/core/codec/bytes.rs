//! 字节串编码
//!
//! 可比较格式按 8 字节分组，不足补 0，每组后跟一个标记字节 `0xFF - 补齐数`；
//! 紧凑格式为变长长度前缀加原始字节，只用于值编码。

use super::buffer::{CodecReader, CodecWriter};
use super::error::{CodecError, CodecResult};

const ENC_GROUP_SIZE: usize = 8;
const ENC_MARKER: u8 = 0xFF;
const ENC_PAD: u8 = 0x00;

pub fn write_comparable_bytes(w: &mut CodecWriter, data: &[u8]) {
    let mut idx = 0;
    while idx <= data.len() {
        let remain = data.len() - idx;
        if remain >= ENC_GROUP_SIZE {
            w.write_bytes(&data[idx..idx + ENC_GROUP_SIZE]);
            w.write_u8(ENC_MARKER);
        } else {
            let pad_count = ENC_GROUP_SIZE - remain;
            w.write_bytes(&data[idx..]);
            for _ in 0..pad_count {
                w.write_u8(ENC_PAD);
            }
            w.write_u8(ENC_MARKER - pad_count as u8);
        }
        idx += ENC_GROUP_SIZE;
    }
}

pub fn read_comparable_bytes(r: &mut CodecReader<'_>) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let group = r.read_bytes(ENC_GROUP_SIZE + 1)?;
        let marker = group[ENC_GROUP_SIZE];
        let pad_count = (ENC_MARKER - marker) as usize;
        if pad_count > ENC_GROUP_SIZE {
            return Err(CodecError::corrupt(format!(
                "invalid bytes group marker {:#04x}",
                marker
            )));
        }
        let real_size = ENC_GROUP_SIZE - pad_count;
        out.extend_from_slice(&group[..real_size]);
        if pad_count != 0 {
            if group[real_size..ENC_GROUP_SIZE].iter().any(|b| *b != ENC_PAD) {
                return Err(CodecError::corrupt("invalid padding in bytes group"));
            }
            return Ok(out);
        }
    }
}

pub fn write_compact_bytes(w: &mut CodecWriter, data: &[u8]) {
    w.write_varint(data.len() as i64);
    w.write_bytes(data);
}

pub fn read_compact_bytes(r: &mut CodecReader<'_>) -> CodecResult<Vec<u8>> {
    let len = r.read_varint()?;
    if len < 0 {
        return Err(CodecError::corrupt(format!("negative compact bytes length {}", len)));
    }
    Ok(r.read_bytes(len as usize)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparable(data: &[u8]) -> Vec<u8> {
        let mut w = CodecWriter::new();
        write_comparable_bytes(&mut w, data);
        w.into_inner()
    }

    #[test]
    fn test_comparable_bytes_layout() {
        assert_eq!(comparable(b""), vec![0, 0, 0, 0, 0, 0, 0, 0, 0xf7]);
        assert_eq!(
            comparable(&[1, 2, 3]),
            vec![1, 2, 3, 0, 0, 0, 0, 0, 0xfa]
        );
        assert_eq!(
            comparable(&[1, 2, 3, 4, 5, 6, 7, 8]),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0xf7]
        );
    }

    #[test]
    fn test_comparable_bytes_ordering() {
        let inputs: [&[u8]; 6] = [b"", b"\x00", b"a", b"a\x00", b"abcdefgh", b"b"];
        for pair in inputs.windows(2) {
            assert!(comparable(pair[0]) < comparable(pair[1]));
        }
    }

    #[test]
    fn test_comparable_bytes_decode() {
        let encoded = comparable(b"hello, memcomparable");
        let mut r = CodecReader::new(&encoded);
        assert_eq!(read_comparable_bytes(&mut r).unwrap(), b"hello, memcomparable");
        assert!(r.eof());

        let mut bad = comparable(b"abc");
        bad[4] = 1;
        assert!(read_comparable_bytes(&mut CodecReader::new(&bad)).is_err());
    }

    #[test]
    fn test_compact_bytes() {
        let mut w = CodecWriter::new();
        write_compact_bytes(&mut w, b"abc");
        assert_eq!(w.as_slice(), &[0x06, b'a', b'b', b'c']);
        let mut r = CodecReader::new(w.as_slice());
        assert_eq!(read_compact_bytes(&mut r).unwrap(), b"abc");
    }
}
