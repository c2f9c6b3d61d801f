//! 十六进制编解码，用于命令行输入输出

use crate::core::codec::{CodecError, CodecResult};

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX_CHARS[usize::from(b >> 4)] as char);
        out.push(HEX_CHARS[usize::from(b & 0x0f)] as char);
    }
    out
}

/// 接受可选的 `0x` 前缀，大小写不敏感
pub fn decode_hex(s: &str) -> CodecResult<Vec<u8>> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if s.len() % 2 != 0 {
        return Err(CodecError::InvalidInput(format!(
            "hex string has odd length {}",
            s.len()
        )));
    }
    s.as_bytes()
        .chunks(2)
        .map(|pair| Ok((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

fn nibble(c: u8) -> CodecResult<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(CodecError::InvalidInput(format!(
            "invalid hex character '{}'",
            c as char
        ))),
    }
}
