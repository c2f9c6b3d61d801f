//! Datum 编解码 - 带类型标记的单值编码
//!
//! 每个 datum 以一个标记字节开头，后跟对应编码族的负载。
//! 键编码（可比较）与旧行格式的值编码共用同一套标记。

use crate::core::types::{DataType, EncodingFamily, UNSPECIFIED_LEN};
use crate::core::value::{MyDecimal, MysqlTime, Value};

use super::buffer::{CodecReader, CodecWriter};
use super::bytes::{read_comparable_bytes, read_compact_bytes, write_comparable_bytes, write_compact_bytes};
use super::error::{CodecError, CodecResult};
use super::json::{read_json, write_json};
use super::number::{read_comparable_f64, read_comparable_i64, write_comparable_f64, write_comparable_i64};

pub const NULL_FLAG: u8 = 0;
pub const BYTES_FLAG: u8 = 1;
pub const COMPACT_BYTES_FLAG: u8 = 2;
pub const INT_FLAG: u8 = 3;
pub const UINT_FLAG: u8 = 4;
pub const FLOATING_FLAG: u8 = 5;
pub const DECIMAL_FLAG: u8 = 6;
pub const DURATION_FLAG: u8 = 7;
pub const VARINT_FLAG: u8 = 8;
pub const UVARINT_FLAG: u8 = 9;
pub const JSON_FLAG: u8 = 10;
pub const MAX_FLAG: u8 = 250;

/// 写入一个可比较的（键）datum
pub fn encode_key(w: &mut CodecWriter, value: &Value, tp: &DataType) -> CodecResult<()> {
    encode_key_with_prefix(w, value, tp, UNSPECIFIED_LEN)
}

/// 写入一个可比较的 datum；`prefix_len` 大于 0 时先截断变长值
pub fn encode_key_with_prefix(
    w: &mut CodecWriter,
    value: &Value,
    tp: &DataType,
    prefix_len: i64,
) -> CodecResult<()> {
    if value.is_null() {
        w.write_u8(NULL_FLAG);
        return Ok(());
    }
    match tp.family() {
        EncodingFamily::Int => {
            w.write_u8(INT_FLAG);
            write_comparable_i64(w, int_of(value, tp)?);
        }
        EncodingFamily::Uint => {
            w.write_u8(UINT_FLAG);
            w.write_u64_be(uint_of(value, tp)?);
        }
        EncodingFamily::Float => {
            w.write_u8(FLOATING_FLAG);
            write_comparable_f64(w, float_of(value, tp)?);
        }
        EncodingFamily::Bytes => {
            let data = truncate_prefix(bytes_of(value, tp)?, tp, prefix_len);
            w.write_u8(BYTES_FLAG);
            write_comparable_bytes(w, data);
        }
        EncodingFamily::Time => {
            w.write_u8(UINT_FLAG);
            w.write_u64_be(time_of(value, tp)?.to_packed_u64());
        }
        EncodingFamily::Duration => {
            w.write_u8(DURATION_FLAG);
            write_comparable_i64(w, duration_of(value, tp)?);
        }
        EncodingFamily::Decimal => {
            w.write_u8(DECIMAL_FLAG);
            write_decimal(w, &decimal_of(value, tp)?, tp)?;
        }
        EncodingFamily::Json => {
            return Err(CodecError::UnsupportedType(format!(
                "{} has no comparable encoding",
                tp.name()
            )))
        }
    }
    Ok(())
}

/// 写入一个旧行格式（v1）中使用的值 datum
pub fn encode_value(w: &mut CodecWriter, value: &Value, tp: &DataType) -> CodecResult<()> {
    if value.is_null() {
        w.write_u8(NULL_FLAG);
        return Ok(());
    }
    match tp.family() {
        EncodingFamily::Int => {
            w.write_u8(VARINT_FLAG);
            w.write_varint(int_of(value, tp)?);
        }
        EncodingFamily::Uint => {
            w.write_u8(UVARINT_FLAG);
            w.write_uvarint(uint_of(value, tp)?);
        }
        EncodingFamily::Bytes => {
            w.write_u8(COMPACT_BYTES_FLAG);
            write_compact_bytes(w, bytes_of(value, tp)?);
        }
        // 浮点、时间、时长、定点数的值编码与键编码相同
        EncodingFamily::Float
        | EncodingFamily::Time
        | EncodingFamily::Duration
        | EncodingFamily::Decimal => {
            encode_key(w, value, tp)?;
        }
        EncodingFamily::Json => {
            w.write_u8(JSON_FLAG);
            write_json(w, json_of(value, tp)?)?;
        }
    }
    Ok(())
}

/// 按标记字节读取一个 datum，结果未按列类型转换
pub fn decode_datum(r: &mut CodecReader<'_>) -> CodecResult<Value> {
    let flag = r.read_u8()?;
    let value = match flag {
        NULL_FLAG => Value::Null,
        INT_FLAG => Value::Int(read_comparable_i64(r)?),
        UINT_FLAG => Value::UInt(r.read_u64_be()?),
        VARINT_FLAG => Value::Int(r.read_varint()?),
        UVARINT_FLAG => Value::UInt(r.read_uvarint()?),
        FLOATING_FLAG => Value::Float(read_comparable_f64(r)?),
        BYTES_FLAG => Value::Bytes(read_comparable_bytes(r)?),
        COMPACT_BYTES_FLAG => Value::Bytes(read_compact_bytes(r)?),
        DURATION_FLAG => Value::Duration(read_comparable_i64(r)?),
        DECIMAL_FLAG => Value::Decimal(read_decimal(r)?),
        JSON_FLAG => Value::Json(read_json(r)?),
        _ => return Err(CodecError::corrupt(format!("invalid datum flag {}", flag))),
    };
    Ok(value)
}

/// 将按标记解出的原始 datum 转换为列类型对应的值
pub fn convert_datum(raw: Value, tp: &DataType) -> CodecResult<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let converted = match tp.family() {
        EncodingFamily::Int => Value::Int(int_of(&raw, tp)?),
        EncodingFamily::Uint => Value::UInt(uint_of(&raw, tp)?),
        EncodingFamily::Float => Value::Float(float_of(&raw, tp)?),
        EncodingFamily::Bytes => bytes_value(bytes_of(&raw, tp)?.to_vec(), tp)?,
        EncodingFamily::Time => match raw {
            Value::UInt(packed) => Value::Time(MysqlTime::from_packed_u64(packed)?),
            other => Value::Time(time_of(&other, tp)?),
        },
        EncodingFamily::Duration => Value::Duration(duration_of(&raw, tp)?),
        EncodingFamily::Decimal => Value::Decimal(decimal_of(&raw, tp)?),
        EncodingFamily::Json => match raw {
            Value::Json(j) => Value::Json(j),
            other => return Err(mismatch(&other, tp)),
        },
    };
    Ok(converted)
}

/// `[precision][frac][二进制]`；列未指定精度时使用值自身的精度和小数位数
pub fn write_decimal(w: &mut CodecWriter, d: &MyDecimal, tp: &DataType) -> CodecResult<()> {
    let (precision, frac) = if tp.length > 0 {
        (tp.length as usize, tp.decimal.max(0) as usize)
    } else {
        d.precision_and_frac()
    };
    let mut bin = Vec::new();
    d.write_bin(precision, frac, &mut bin)?;
    w.write_u8(precision as u8);
    w.write_u8(frac as u8);
    w.write_bytes(&bin);
    Ok(())
}

pub fn read_decimal(r: &mut CodecReader<'_>) -> CodecResult<MyDecimal> {
    let precision = usize::from(r.read_u8()?);
    let frac = usize::from(r.read_u8()?);
    let (d, size) = MyDecimal::read_bin(r.remaining(), precision, frac)?;
    r.read_bytes(size)?;
    Ok(d)
}

/// 字符类型解码为字符串，二进制类型保留字节
pub fn bytes_value(data: Vec<u8>, tp: &DataType) -> CodecResult<Value> {
    if tp.is_text() {
        String::from_utf8(data)
            .map(Value::String)
            .map_err(|e| CodecError::corrupt(format!("invalid utf-8 in {} column: {}", tp.name(), e)))
    } else {
        Ok(Value::Bytes(data))
    }
}

fn truncate_prefix<'a>(data: &'a [u8], tp: &DataType, prefix_len: i64) -> &'a [u8] {
    if prefix_len <= 0 {
        return data;
    }
    let limit = prefix_len as usize;
    if tp.is_text() {
        if let Ok(s) = std::str::from_utf8(data) {
            return match s.char_indices().nth(limit) {
                Some((end, _)) => &data[..end],
                None => data,
            };
        }
    }
    &data[..data.len().min(limit)]
}

fn mismatch(value: &Value, tp: &DataType) -> CodecError {
    CodecError::TypeMismatch(format!(
        "{} value {} cannot be stored in {} column",
        value.type_name(),
        value,
        tp.name()
    ))
}

pub(crate) fn int_of(value: &Value, tp: &DataType) -> CodecResult<i64> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::UInt(v) => i64::try_from(*v).map_err(|_| mismatch(value, tp)),
        _ => Err(mismatch(value, tp)),
    }
}

pub(crate) fn uint_of(value: &Value, tp: &DataType) -> CodecResult<u64> {
    match value {
        Value::UInt(v) => Ok(*v),
        Value::Int(v) => u64::try_from(*v).map_err(|_| mismatch(value, tp)),
        _ => Err(mismatch(value, tp)),
    }
}

pub(crate) fn float_of(value: &Value, tp: &DataType) -> CodecResult<f64> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        Value::UInt(v) => Ok(*v as f64),
        _ => Err(mismatch(value, tp)),
    }
}

pub(crate) fn bytes_of<'a>(value: &'a Value, tp: &DataType) -> CodecResult<&'a [u8]> {
    value.as_bytes().ok_or_else(|| mismatch(value, tp))
}

pub(crate) fn time_of(value: &Value, tp: &DataType) -> CodecResult<MysqlTime> {
    match value {
        Value::Time(t) => match t.invalid_field() {
            None => Ok(*t),
            Some(field) => Err(CodecError::TypeMismatch(format!(
                "{} of {} is out of range for {} column",
                field,
                t,
                tp.name()
            ))),
        },
        _ => Err(mismatch(value, tp)),
    }
}

pub(crate) fn decimal_of(value: &Value, tp: &DataType) -> CodecResult<MyDecimal> {
    match value {
        Value::Decimal(d) => Ok(d.clone()),
        Value::Int(v) => Ok(MyDecimal::from(*v)),
        Value::UInt(v) => Ok(MyDecimal::from(*v)),
        _ => Err(mismatch(value, tp)),
    }
}

pub(crate) fn json_of<'a>(value: &'a Value, tp: &DataType) -> CodecResult<&'a serde_json::Value> {
    match value {
        Value::Json(j) => Ok(j),
        _ => Err(mismatch(value, tp)),
    }
}

pub(crate) fn duration_of(value: &Value, tp: &DataType) -> CodecResult<i64> {
    match value {
        Value::Duration(nanos) | Value::Int(nanos) => Ok(*nanos),
        _ => Err(mismatch(value, tp)),
    }
}
