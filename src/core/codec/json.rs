//! 二进制 JSON 编解码
//!
//! 值以一个类型码字节开头，后跟该类型的负载：
//!
//! ```text
//! 字面量  [0x00 null | 0x01 true | 0x02 false]
//! 整数    i64 / u64 / f64 位模式，8 字节小端序
//! 字符串  [UVARINT 长度][UTF-8 字节]
//! 对象    [元素数 u32 LE][总长 u32 LE][键项 (偏移 u32, 长度 u16) * n]
//!         [值项 (类型码 u8, 偏移或内联字面量 u32) * n][键][值]
//! 数组    [元素数 u32 LE][总长 u32 LE][值项 * n][值]
//! ```
//!
//! 容器内的偏移相对容器负载起点；对象的键按字节序排列。

use serde_json::{Map, Number, Value as JsonValue};

use super::buffer::{CodecReader, CodecWriter};
use super::error::{CodecError, CodecResult};

pub const TYPE_CODE_OBJECT: u8 = 0x01;
pub const TYPE_CODE_ARRAY: u8 = 0x03;
pub const TYPE_CODE_LITERAL: u8 = 0x04;
pub const TYPE_CODE_INT64: u8 = 0x09;
pub const TYPE_CODE_UINT64: u8 = 0x0a;
pub const TYPE_CODE_FLOAT64: u8 = 0x0b;
pub const TYPE_CODE_STRING: u8 = 0x0c;

const LITERAL_NIL: u8 = 0x00;
const LITERAL_TRUE: u8 = 0x01;
const LITERAL_FALSE: u8 = 0x02;

const HEADER_SIZE: usize = 8;
const KEY_ENTRY_SIZE: usize = 6;
const VALUE_ENTRY_SIZE: usize = 5;
const MAX_DEPTH: usize = 100;

/// 写入类型码和负载
pub fn write_json(w: &mut CodecWriter, value: &JsonValue) -> CodecResult<()> {
    let mut buf = Vec::new();
    let type_code = append_value(&mut buf, value)?;
    w.write_u8(type_code);
    w.write_bytes(&buf);
    Ok(())
}

/// 读取一个自带长度的 JSON 值（类型码 + 负载）
pub fn read_json(r: &mut CodecReader<'_>) -> CodecResult<JsonValue> {
    let type_code = r.read_u8()?;
    let size = payload_size(type_code, r.remaining())?;
    let payload = r.read_bytes(size)?;
    decode_value(type_code, payload, 0)
}

/// 从类型码和恰好一个负载的字节中解码
pub fn decode_json(data: &[u8]) -> CodecResult<JsonValue> {
    let mut r = CodecReader::new(data);
    let value = read_json(&mut r)?;
    if !r.eof() {
        return Err(CodecError::corrupt(format!(
            "{} trailing bytes after json value",
            r.remaining().len()
        )));
    }
    Ok(value)
}

fn append_value(buf: &mut Vec<u8>, value: &JsonValue) -> CodecResult<u8> {
    let type_code = match value {
        JsonValue::Null => {
            buf.push(LITERAL_NIL);
            TYPE_CODE_LITERAL
        }
        JsonValue::Bool(b) => {
            buf.push(if *b { LITERAL_TRUE } else { LITERAL_FALSE });
            TYPE_CODE_LITERAL
        }
        JsonValue::Number(n) => append_number(buf, n)?,
        JsonValue::String(s) => {
            let mut w = CodecWriter::with_capacity(s.len() + 2);
            w.write_uvarint(s.len() as u64);
            w.write_bytes(s.as_bytes());
            buf.extend_from_slice(w.as_slice());
            TYPE_CODE_STRING
        }
        JsonValue::Array(items) => {
            append_array(buf, items)?;
            TYPE_CODE_ARRAY
        }
        JsonValue::Object(map) => {
            append_object(buf, map)?;
            TYPE_CODE_OBJECT
        }
    };
    Ok(type_code)
}

fn append_number(buf: &mut Vec<u8>, n: &Number) -> CodecResult<u8> {
    if let Some(v) = n.as_i64() {
        buf.extend_from_slice(&v.to_le_bytes());
        Ok(TYPE_CODE_INT64)
    } else if let Some(v) = n.as_u64() {
        buf.extend_from_slice(&v.to_le_bytes());
        Ok(TYPE_CODE_UINT64)
    } else if let Some(v) = n.as_f64() {
        buf.extend_from_slice(&v.to_bits().to_le_bytes());
        Ok(TYPE_CODE_FLOAT64)
    } else {
        Err(CodecError::InvalidInput(format!("json number {} is not representable", n)))
    }
}

fn append_array(buf: &mut Vec<u8>, items: &[JsonValue]) -> CodecResult<()> {
    let doc_off = buf.len();
    buf.extend_from_slice(&u32_len(items.len())?.to_le_bytes());
    buf.extend_from_slice(&[0; 4]);
    let entries_off = buf.len();
    buf.resize(entries_off + items.len() * VALUE_ENTRY_SIZE, 0);
    for (i, item) in items.iter().enumerate() {
        append_element(buf, doc_off, entries_off + i * VALUE_ENTRY_SIZE, item)?;
    }
    finish_container(buf, doc_off)
}

fn append_object(buf: &mut Vec<u8>, map: &Map<String, JsonValue>) -> CodecResult<()> {
    let mut fields: Vec<(&String, &JsonValue)> = map.iter().collect();
    fields.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let doc_off = buf.len();
    buf.extend_from_slice(&u32_len(fields.len())?.to_le_bytes());
    buf.extend_from_slice(&[0; 4]);
    let key_entries_off = buf.len();
    let value_entries_off = key_entries_off + fields.len() * KEY_ENTRY_SIZE;
    buf.resize(value_entries_off + fields.len() * VALUE_ENTRY_SIZE, 0);

    for (i, (key, _)) in fields.iter().enumerate() {
        let key_len = u16::try_from(key.len()).map_err(|_| {
            CodecError::InvalidInput(format!("json object key of {} bytes is too long", key.len()))
        })?;
        let entry = key_entries_off + i * KEY_ENTRY_SIZE;
        let key_off = u32_len(buf.len() - doc_off)?;
        buf[entry..entry + 4].copy_from_slice(&key_off.to_le_bytes());
        buf[entry + 4..entry + 6].copy_from_slice(&key_len.to_le_bytes());
        buf.extend_from_slice(key.as_bytes());
    }
    for (i, (_, value)) in fields.iter().enumerate() {
        append_element(buf, doc_off, value_entries_off + i * VALUE_ENTRY_SIZE, value)?;
    }
    finish_container(buf, doc_off)
}

/// 字面量内联在值项中，其他值追加到末尾并记录偏移
fn append_element(buf: &mut Vec<u8>, doc_off: usize, entry: usize, value: &JsonValue) -> CodecResult<()> {
    let value_off = buf.len();
    let type_code = append_value(buf, value)?;
    buf[entry] = type_code;
    if type_code == TYPE_CODE_LITERAL {
        let literal = buf[value_off];
        buf.truncate(value_off);
        buf[entry + 1] = literal;
    } else {
        let off = u32_len(value_off - doc_off)?;
        buf[entry + 1..entry + 5].copy_from_slice(&off.to_le_bytes());
    }
    Ok(())
}

fn finish_container(buf: &mut [u8], doc_off: usize) -> CodecResult<()> {
    let size = u32_len(buf.len() - doc_off)?;
    buf[doc_off + 4..doc_off + 8].copy_from_slice(&size.to_le_bytes());
    Ok(())
}

fn u32_len(len: usize) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| CodecError::InvalidInput(format!("json value of {} bytes is too large", len)))
}

fn payload_size(type_code: u8, data: &[u8]) -> CodecResult<usize> {
    match type_code {
        TYPE_CODE_LITERAL => Ok(1),
        TYPE_CODE_INT64 | TYPE_CODE_UINT64 | TYPE_CODE_FLOAT64 => Ok(8),
        TYPE_CODE_STRING => {
            let mut r = CodecReader::new(data);
            let len = r.read_uvarint()?;
            usize::try_from(len)
                .ok()
                .and_then(|len| len.checked_add(r.position()))
                .ok_or_else(|| CodecError::corrupt(format!("json string length {} overflows", len)))
        }
        TYPE_CODE_OBJECT | TYPE_CODE_ARRAY => Ok(read_u32(data, 4)? as usize),
        other => Err(unsupported(other)),
    }
}

fn unsupported(type_code: u8) -> CodecError {
    CodecError::UnsupportedType(format!("json type code {:#04x}", type_code))
}

fn slice(data: &[u8], start: usize, len: usize) -> CodecResult<&[u8]> {
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| {
            CodecError::corrupt(format!(
                "json needs {} bytes at offset {}, container has {}",
                len,
                start,
                data.len()
            ))
        })
}

fn read_u32(data: &[u8], off: usize) -> CodecResult<u32> {
    let b = slice(data, off, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_u16(data: &[u8], off: usize) -> CodecResult<u16> {
    let b = slice(data, off, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn read_eight(data: &[u8]) -> CodecResult<[u8; 8]> {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(slice(data, 0, 8)?);
    Ok(buf)
}

fn decode_value(type_code: u8, data: &[u8], depth: usize) -> CodecResult<JsonValue> {
    if depth > MAX_DEPTH {
        return Err(CodecError::corrupt("json value nested too deeply"));
    }
    let value = match type_code {
        TYPE_CODE_LITERAL => match slice(data, 0, 1)?[0] {
            LITERAL_NIL => JsonValue::Null,
            LITERAL_TRUE => JsonValue::Bool(true),
            LITERAL_FALSE => JsonValue::Bool(false),
            other => return Err(CodecError::corrupt(format!("invalid json literal {}", other))),
        },
        TYPE_CODE_INT64 => JsonValue::from(i64::from_le_bytes(read_eight(data)?)),
        TYPE_CODE_UINT64 => JsonValue::from(u64::from_le_bytes(read_eight(data)?)),
        TYPE_CODE_FLOAT64 => {
            let v = f64::from_bits(u64::from_le_bytes(read_eight(data)?));
            Number::from_f64(v)
                .map(JsonValue::Number)
                .ok_or_else(|| CodecError::corrupt(format!("json float {} is not finite", v)))?
        }
        TYPE_CODE_STRING => {
            let mut r = CodecReader::new(data);
            let len = r.read_uvarint()?;
            let len = usize::try_from(len)
                .map_err(|_| CodecError::corrupt(format!("json string length {} overflows", len)))?;
            let bytes = r.read_bytes(len)?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| CodecError::corrupt(format!("invalid utf-8 in json string: {}", e)))?;
            JsonValue::String(s.to_string())
        }
        TYPE_CODE_ARRAY => {
            let (count, doc) = container(data)?;
            let items = (0..count)
                .map(|i| decode_element(doc, HEADER_SIZE + i * VALUE_ENTRY_SIZE, depth))
                .collect::<CodecResult<Vec<_>>>()?;
            JsonValue::Array(items)
        }
        TYPE_CODE_OBJECT => {
            let (count, doc) = container(data)?;
            let value_entries = HEADER_SIZE + count * KEY_ENTRY_SIZE;
            let mut map = Map::new();
            for i in 0..count {
                let entry = HEADER_SIZE + i * KEY_ENTRY_SIZE;
                let key_off = read_u32(doc, entry)? as usize;
                let key_len = usize::from(read_u16(doc, entry + 4)?);
                let key = std::str::from_utf8(slice(doc, key_off, key_len)?)
                    .map_err(|e| CodecError::corrupt(format!("invalid utf-8 in json key: {}", e)))?;
                let value = decode_element(doc, value_entries + i * VALUE_ENTRY_SIZE, depth)?;
                map.insert(key.to_string(), value);
            }
            JsonValue::Object(map)
        }
        other => return Err(unsupported(other)),
    };
    Ok(value)
}

/// 校验容器头部，返回元素数和按总长截取的容器字节
fn container(data: &[u8]) -> CodecResult<(usize, &[u8])> {
    let count = read_u32(data, 0)? as usize;
    let size = read_u32(data, 4)? as usize;
    let doc = slice(data, 0, size)?;
    if count > size / VALUE_ENTRY_SIZE {
        return Err(CodecError::corrupt(format!(
            "json container of {} bytes cannot hold {} elements",
            size, count
        )));
    }
    Ok((count, doc))
}

fn decode_element(doc: &[u8], entry: usize, depth: usize) -> CodecResult<JsonValue> {
    let item = slice(doc, entry, VALUE_ENTRY_SIZE)?;
    let type_code = item[0];
    if type_code == TYPE_CODE_LITERAL {
        return decode_value(type_code, &item[1..2], depth + 1);
    }
    let off = read_u32(item, 1)? as usize;
    let rest = doc
        .get(off..)
        .ok_or_else(|| CodecError::corrupt(format!("json value offset {} out of range", off)))?;
    decode_value(type_code, rest, depth + 1)
}
