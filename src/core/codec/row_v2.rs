//! 新行格式（v2）
//!
//! ```text
//! [0x80][flag][非空列数 u16 LE][空列数 u16 LE]
//! [列 ID：先非空列升序，再空列升序；小行 u8，大行 u32 LE]
//! [非空列值的结束偏移：小行 u16 LE，大行 u32 LE]
//! [列值数据]
//! ```
//!
//! 任一列 ID 大于 255 或数据区超过 65535 字节时使用大行布局（flag bit0）。

use log::trace;

use crate::core::handle::Handle;
use crate::core::row::Row;
use crate::core::schema::{ColumnInfo, TableInfo};
use crate::core::types::{DataType, EncodingFamily};
use crate::core::value::{MysqlTime, Value};

use super::buffer::{CodecReader, CodecWriter};
use super::datum::{
    bytes_of, bytes_value, decimal_of, duration_of, float_of, int_of, json_of, read_decimal,
    time_of, uint_of, write_decimal,
};
use super::error::{CodecError, CodecResult};
use super::json::{decode_json, write_json};
use super::number::{decode_comparable_f64, encode_comparable_f64};
use super::table_codec::handle_column_value;

/// 新行格式的版本字节
pub const CODEC_VER: u8 = 128;
const FLAG_LARGE: u8 = 1;
const HEADER_LEN: usize = 6;

struct EncodedColumn {
    id: i64,
    data: Vec<u8>,
}

pub fn encode_row(columns: &[ColumnInfo], values: &[Value], is_pk_handle: bool) -> CodecResult<Vec<u8>> {
    let mut not_null = Vec::new();
    let mut nulls = Vec::new();
    for (col, value) in columns.iter().zip(values) {
        if col.is_handle_column(is_pk_handle) || col.virtual_generated {
            continue;
        }
        if col.id < 0 || col.id > i64::from(u32::MAX) {
            return Err(CodecError::InvalidInput(format!(
                "column {} has id {} outside the new row format range",
                col.name, col.id
            )));
        }
        if value.is_null() {
            nulls.push(col.id);
        } else {
            not_null.push(EncodedColumn {
                id: col.id,
                data: encode_value(value, &col.data_type)?,
            });
        }
    }
    not_null.sort_by_key(|c| c.id);
    nulls.sort_unstable();

    let data_len: usize = not_null.iter().map(|c| c.data.len()).sum();
    let max_id = not_null
        .iter()
        .map(|c| c.id)
        .chain(nulls.iter().copied())
        .max()
        .unwrap_or(0);
    let large = max_id > 255 || data_len > usize::from(u16::MAX);

    if not_null.len() > usize::from(u16::MAX) || nulls.len() > usize::from(u16::MAX) {
        return Err(CodecError::InvalidInput(format!(
            "too many columns for one row: {} not null, {} null",
            not_null.len(),
            nulls.len()
        )));
    }
    if data_len > u32::MAX as usize {
        return Err(CodecError::InvalidInput(format!(
            "row data of {} bytes exceeds the new row format limit",
            data_len
        )));
    }

    let id_width = if large { 4 } else { 1 };
    let offset_width = if large { 4 } else { 2 };
    let ids_count = not_null.len() + nulls.len();
    let mut w = CodecWriter::with_capacity(
        HEADER_LEN + ids_count * id_width + not_null.len() * offset_width + data_len,
    );
    w.write_u8(CODEC_VER);
    w.write_u8(if large { FLAG_LARGE } else { 0 });
    w.write_u16_le(not_null.len() as u16);
    w.write_u16_le(nulls.len() as u16);

    for id in not_null.iter().map(|c| c.id).chain(nulls.iter().copied()) {
        if large {
            w.write_u32_le(id as u32);
        } else {
            w.write_u8(id as u8);
        }
    }
    let mut end = 0usize;
    for col in &not_null {
        end += col.data.len();
        if large {
            w.write_u32_le(end as u32);
        } else {
            w.write_u16_le(end as u16);
        }
    }
    for col in &not_null {
        w.write_bytes(&col.data);
    }
    Ok(w.into_inner())
}

/// 解析后的行头，列值按需切片
struct RowV2<'a> {
    not_null_ids: Vec<i64>,
    null_ids: Vec<i64>,
    offsets: Vec<usize>,
    data: &'a [u8],
}

impl<'a> RowV2<'a> {
    fn parse(value: &'a [u8]) -> CodecResult<Self> {
        let mut r = CodecReader::new(value);
        let ver = r.read_u8()?;
        if ver != CODEC_VER {
            return Err(CodecError::corrupt(format!("invalid row format version {}", ver)));
        }
        let large = r.read_u8()? & FLAG_LARGE != 0;
        let num_not_null = usize::from(r.read_u16_le()?);
        let num_null = usize::from(r.read_u16_le()?);

        let read_id = |r: &mut CodecReader<'a>| -> CodecResult<i64> {
            if large {
                Ok(i64::from(r.read_u32_le()?))
            } else {
                Ok(i64::from(r.read_u8()?))
            }
        };
        let not_null_ids = (0..num_not_null)
            .map(|_| read_id(&mut r))
            .collect::<CodecResult<Vec<_>>>()?;
        let null_ids = (0..num_null)
            .map(|_| read_id(&mut r))
            .collect::<CodecResult<Vec<_>>>()?;

        let mut offsets = Vec::with_capacity(num_not_null);
        for _ in 0..num_not_null {
            let end = if large {
                r.read_u32_le()? as usize
            } else {
                usize::from(r.read_u16_le()?)
            };
            if offsets.last().is_some_and(|prev| end < *prev) {
                return Err(CodecError::corrupt("row value offsets are not ascending"));
            }
            offsets.push(end);
        }
        let data = r.remaining();
        if offsets.last().is_some_and(|end| *end > data.len()) {
            return Err(CodecError::corrupt(format!(
                "row value data truncated: need {} bytes, have {}",
                offsets.last().copied().unwrap_or(0),
                data.len()
            )));
        }
        Ok(Self {
            not_null_ids,
            null_ids,
            offsets,
            data,
        })
    }

    fn column_data(&self, col_id: i64) -> Option<&'a [u8]> {
        let idx = self.not_null_ids.binary_search(&col_id).ok()?;
        let start = if idx == 0 { 0 } else { self.offsets[idx - 1] };
        let data: &'a [u8] = self.data;
        Some(&data[start..self.offsets[idx]])
    }

    fn is_null(&self, col_id: i64) -> bool {
        self.null_ids.binary_search(&col_id).is_ok()
    }
}

pub fn decode_row(value: &[u8], handle: &Handle, table_info: &TableInfo) -> CodecResult<Row> {
    let row = RowV2::parse(value)?;
    trace!(
        "decoding new format row: {} not null, {} null columns",
        row.not_null_ids.len(),
        row.null_ids.len()
    );
    let mut values = Vec::with_capacity(table_info.columns.len());
    for col in &table_info.columns {
        if col.is_handle_column(table_info.pk_is_handle) {
            values.push(handle_column_value(handle, col)?);
            continue;
        }
        let v = match row.column_data(col.id) {
            Some(data) => decode_value(data, &col.data_type)?,
            None if row.is_null(col.id) => Value::Null,
            None => col.origin_default.clone().unwrap_or(Value::Null),
        };
        values.push(v);
    }
    Ok(Row::new(values))
}

fn encode_value(value: &Value, tp: &DataType) -> CodecResult<Vec<u8>> {
    let data = match tp.family() {
        EncodingFamily::Int => encode_int(int_of(value, tp)?),
        EncodingFamily::Uint => encode_uint(uint_of(value, tp)?),
        EncodingFamily::Float => encode_comparable_f64(float_of(value, tp)?).to_be_bytes().to_vec(),
        EncodingFamily::Bytes => bytes_of(value, tp)?.to_vec(),
        EncodingFamily::Time => encode_uint(time_of(value, tp)?.to_packed_u64()),
        EncodingFamily::Duration => encode_int(duration_of(value, tp)?),
        EncodingFamily::Decimal => {
            let mut w = CodecWriter::new();
            write_decimal(&mut w, &decimal_of(value, tp)?, tp)?;
            w.into_inner()
        }
        EncodingFamily::Json => {
            let mut w = CodecWriter::new();
            write_json(&mut w, json_of(value, tp)?)?;
            w.into_inner()
        }
    };
    Ok(data)
}

fn decode_value(data: &[u8], tp: &DataType) -> CodecResult<Value> {
    let value = match tp.family() {
        EncodingFamily::Int => Value::Int(decode_int(data)?),
        EncodingFamily::Uint => Value::UInt(decode_uint(data)?),
        EncodingFamily::Float => {
            let bits: [u8; 8] = data
                .try_into()
                .map_err(|_| CodecError::corrupt(format!("float value has {} bytes", data.len())))?;
            Value::Float(decode_comparable_f64(u64::from_be_bytes(bits)))
        }
        EncodingFamily::Bytes => bytes_value(data.to_vec(), tp)?,
        EncodingFamily::Time => Value::Time(MysqlTime::from_packed_u64(decode_uint(data)?)?),
        EncodingFamily::Duration => Value::Duration(decode_int(data)?),
        EncodingFamily::Decimal => {
            let mut r = CodecReader::new(data);
            let d = read_decimal(&mut r)?;
            if !r.eof() {
                return Err(CodecError::corrupt(format!(
                    "{} trailing bytes after decimal value",
                    r.remaining().len()
                )));
            }
            Value::Decimal(d)
        }
        EncodingFamily::Json => Value::Json(decode_json(data)?),
    };
    Ok(value)
}

/// 有符号整数按能容纳的最短宽度写成小端序
fn encode_int(v: i64) -> Vec<u8> {
    if let Ok(v) = i8::try_from(v) {
        v.to_le_bytes().to_vec()
    } else if let Ok(v) = i16::try_from(v) {
        v.to_le_bytes().to_vec()
    } else if let Ok(v) = i32::try_from(v) {
        v.to_le_bytes().to_vec()
    } else {
        v.to_le_bytes().to_vec()
    }
}

fn encode_uint(v: u64) -> Vec<u8> {
    if let Ok(v) = u8::try_from(v) {
        vec![v]
    } else if let Ok(v) = u16::try_from(v) {
        v.to_le_bytes().to_vec()
    } else if let Ok(v) = u32::try_from(v) {
        v.to_le_bytes().to_vec()
    } else {
        v.to_le_bytes().to_vec()
    }
}

fn decode_int(data: &[u8]) -> CodecResult<i64> {
    match data.len() {
        1 => Ok(i64::from(data[0] as i8)),
        2 => Ok(i64::from(i16::from_le_bytes([data[0], data[1]]))),
        4 => Ok(i64::from(i32::from_le_bytes([data[0], data[1], data[2], data[3]]))),
        8 => Ok(i64::from_le_bytes(eight(data))),
        n => Err(CodecError::corrupt(format!("invalid int value length {}", n))),
    }
}

fn decode_uint(data: &[u8]) -> CodecResult<u64> {
    match data.len() {
        1 => Ok(u64::from(data[0])),
        2 => Ok(u64::from(u16::from_le_bytes([data[0], data[1]]))),
        4 => Ok(u64::from(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))),
        8 => Ok(u64::from_le_bytes(eight(data))),
        n => Err(CodecError::corrupt(format!("invalid uint value length {}", n))),
    }
}

fn eight(data: &[u8]) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[..8]);
    buf
}
