//! 旧行格式（v1）
//!
//! 行值是一串 `(列 ID, 列值)` datum：列 ID 用 VARINT 标记编码，
//! 列值使用值编码。所有列都被跳过的行写成单个 NULL 标记字节。

use std::collections::HashMap;

use log::debug;

use crate::core::handle::Handle;
use crate::core::row::Row;
use crate::core::schema::{ColumnInfo, TableInfo};
use crate::core::value::Value;

use super::buffer::{CodecReader, CodecWriter};
use super::datum::{self, NULL_FLAG, VARINT_FLAG};
use super::error::{CodecError, CodecResult};
use super::table_codec::handle_column_value;

pub fn encode_row(columns: &[ColumnInfo], values: &[Value], is_pk_handle: bool) -> CodecResult<Vec<u8>> {
    let mut w = CodecWriter::new();
    for (col, value) in columns.iter().zip(values) {
        if col.is_handle_column(is_pk_handle) {
            continue;
        }
        w.write_u8(VARINT_FLAG);
        w.write_varint(col.id);
        datum::encode_value(&mut w, value, &col.data_type)?;
    }
    if w.is_empty() {
        return Ok(vec![NULL_FLAG]);
    }
    Ok(w.into_inner())
}

pub fn decode_row(value: &[u8], handle: &Handle, table_info: &TableInfo) -> CodecResult<Row> {
    let stored = decode_to_map(value, table_info)?;
    let mut values = Vec::with_capacity(table_info.columns.len());
    for col in &table_info.columns {
        if col.is_handle_column(table_info.pk_is_handle) {
            values.push(handle_column_value(handle, col)?);
            continue;
        }
        let v = match stored.get(&col.id) {
            Some(v) => v.clone(),
            None => col.origin_default.clone().unwrap_or(Value::Null),
        };
        values.push(v);
    }
    Ok(Row::new(values))
}

fn decode_to_map(value: &[u8], table_info: &TableInfo) -> CodecResult<HashMap<i64, Value>> {
    let mut stored = HashMap::new();
    if value == [NULL_FLAG] {
        return Ok(stored);
    }
    let mut r = CodecReader::new(value);
    while !r.eof() {
        let col_id = match datum::decode_datum(&mut r)? {
            Value::Int(id) => id,
            other => {
                return Err(CodecError::corrupt(format!(
                    "expected column id at offset {}, found {} datum",
                    r.position(),
                    other.type_name()
                )))
            }
        };
        let raw = datum::decode_datum(&mut r)?;
        match table_info.column_by_id(col_id) {
            Some(col) => {
                let v = datum::convert_datum(raw, &col.data_type)?;
                stored.insert(col_id, v);
            }
            None => debug!("ignoring unknown column {} in table {}", col_id, table_info.name),
        }
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::datum::COMPACT_BYTES_FLAG;
    use crate::core::types::{DataType, TypeKind};

    fn columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::new(1, "id", 0, DataType::BIGINT).primary_key(),
            ColumnInfo::new(2, "name", 1, DataType::new(TypeKind::Varchar)),
        ]
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode_row(&columns(), &[Value::Int(1), Value::from("ab")], true).unwrap();
        assert_eq!(
            bytes,
            vec![VARINT_FLAG, 4, COMPACT_BYTES_FLAG, 4, b'a', b'b']
        );
    }

    #[test]
    fn test_all_skipped_row_is_null_flag() {
        let cols = vec![ColumnInfo::new(1, "id", 0, DataType::BIGINT).primary_key()];
        let bytes = encode_row(&cols, &[Value::Int(1)], true).unwrap();
        assert_eq!(bytes, vec![NULL_FLAG]);

        let table = TableInfo::new(1, "t", cols).pk_is_handle();
        let row = decode_row(&bytes, &Handle::Int(9), &table).unwrap();
        assert_eq!(row.values(), &[Value::Int(9)]);
    }

    #[test]
    fn test_unknown_and_missing_columns() {
        let mut w = CodecWriter::new();
        w.write_u8(VARINT_FLAG);
        w.write_varint(99);
        datum::encode_value(&mut w, &Value::Int(5), &DataType::BIGINT).unwrap();

        let mut cols = columns();
        cols.push(
            ColumnInfo::new(3, "age", 2, DataType::BIGINT).origin_default(Value::Int(18)),
        );
        let table = TableInfo::new(1, "t", cols).pk_is_handle();
        let row = decode_row(w.as_slice(), &Handle::Int(3), &table).unwrap();
        assert_eq!(row.values(), &[Value::Int(3), Value::Null, Value::Int(18)]);
    }

    #[test]
    fn test_truncated_value_is_corrupt() {
        let bytes = encode_row(&columns(), &[Value::Int(1), Value::from("abc")], true).unwrap();
        let table = TableInfo::new(1, "t", columns()).pk_is_handle();
        let err = decode_row(&bytes[..bytes.len() - 1], &Handle::Int(1), &table);
        assert!(matches!(err, Err(CodecError::ValueCorrupt(_))));
    }
}
