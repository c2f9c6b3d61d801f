//! 可比较数值编码
//!
//! 有符号整数翻转符号位后按大端序写出，浮点数按 IEEE 754 位模式变换，
//! 编码后的字节序与数值顺序一致。

use super::buffer::{CodecReader, CodecWriter};
use super::error::CodecResult;

const SIGN_MASK: u64 = 0x8000_0000_0000_0000;

pub fn encode_comparable_i64(value: i64) -> u64 {
    (value as u64) ^ SIGN_MASK
}

pub fn decode_comparable_i64(value: u64) -> i64 {
    (value ^ SIGN_MASK) as i64
}

pub fn encode_comparable_f64(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits & SIGN_MASK == 0 {
        bits | SIGN_MASK
    } else {
        !bits
    }
}

pub fn decode_comparable_f64(value: u64) -> f64 {
    let bits = if value & SIGN_MASK > 0 {
        value & !SIGN_MASK
    } else {
        !value
    };
    f64::from_bits(bits)
}

pub fn write_comparable_i64(w: &mut CodecWriter, value: i64) {
    w.write_u64_be(encode_comparable_i64(value));
}

pub fn read_comparable_i64(r: &mut CodecReader<'_>) -> CodecResult<i64> {
    Ok(decode_comparable_i64(r.read_u64_be()?))
}

pub fn write_comparable_f64(w: &mut CodecWriter, value: f64) {
    w.write_u64_be(encode_comparable_f64(value));
}

pub fn read_comparable_f64(r: &mut CodecReader<'_>) -> CodecResult<f64> {
    Ok(decode_comparable_f64(r.read_u64_be()?))
}
