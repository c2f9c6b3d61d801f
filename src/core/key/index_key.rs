//! IndexKey - 二级索引键
//!
//! 布局：`'t'` + 表 ID（可比较 i64）+ `"_i"` + 索引 ID（可比较 i64）+ 各索引列键。

use log::trace;

use crate::core::codec::buffer::{CodecReader, CodecWriter};
use crate::core::codec::error::{CodecError, CodecResult};
use crate::core::codec::number::{read_comparable_i64, write_comparable_i64};
use crate::core::handle::Handle;
use crate::core::row::Row;
use crate::core::schema::{IndexColumn, TableInfo};
use crate::core::types::DataType;
use crate::core::value::Value;

use super::typed_key::{to_typed_key, to_typed_key_with_prefix};
use super::{Key, IDX_PREFIX_SEP, TBL_PREFIX};

/// 固定前缀长度：1 + 8 + 2 + 8
pub const INDEX_PREFIX_LEN: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    key: Key,
    table_id: i64,
    index_id: i64,
    data_keys: Vec<Key>,
}

impl IndexKey {
    pub fn new(table_id: i64, index_id: i64, data_keys: Vec<Key>) -> Self {
        let key = Self::encode(table_id, index_id, &data_keys);
        Self {
            key,
            table_id,
            index_id,
            data_keys,
        }
    }

    /// 列键必须齐全；缺失的值应先由调用方转换成 NULL 键
    pub fn try_new(table_id: i64, index_id: i64, data_keys: Vec<Option<Key>>) -> CodecResult<Self> {
        let data_keys = data_keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                key.ok_or_else(|| {
                    CodecError::MalformedKey(format!("index key component {} cannot be null", i))
                })
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self::new(table_id, index_id, data_keys))
    }

    /// 只含表 ID 与索引 ID 的前缀，用于整索引扫描
    pub fn index_prefix(table_id: i64, index_id: i64) -> Key {
        Self::encode(table_id, index_id, &[])
    }

    /// 解析固定前缀，返回表 ID、索引 ID 以及剩余的列键字节
    pub fn decode_prefix(bytes: &[u8]) -> CodecResult<(i64, i64, &[u8])> {
        if bytes.len() < INDEX_PREFIX_LEN {
            return Err(CodecError::MalformedKey(format!(
                "index key too short: {} bytes",
                bytes.len()
            )));
        }
        let mut r = CodecReader::new(bytes);
        if r.read_u8()? != TBL_PREFIX {
            return Err(CodecError::MalformedKey("missing table prefix".to_string()));
        }
        let table_id = read_comparable_i64(&mut r)?;
        if r.read_bytes(2)? != IDX_PREFIX_SEP {
            return Err(CodecError::MalformedKey("missing index separator".to_string()));
        }
        let index_id = read_comparable_i64(&mut r)?;
        Ok((table_id, index_id, r.remaining()))
    }

    fn encode(table_id: i64, index_id: i64, data_keys: &[Key]) -> Key {
        let capacity = INDEX_PREFIX_LEN + data_keys.iter().map(Key::len).sum::<usize>();
        let mut w = CodecWriter::with_capacity(capacity);
        w.write_u8(TBL_PREFIX);
        write_comparable_i64(&mut w, table_id);
        w.write_bytes(&IDX_PREFIX_SEP);
        write_comparable_i64(&mut w, index_id);
        for key in data_keys {
            w.write_bytes(key.as_bytes());
        }
        Key::new(w.into_inner())
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn index_id(&self) -> i64 {
        self.index_id
    }

    pub fn data_keys(&self) -> &[Key] {
        &self.data_keys
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.data_keys.iter().map(Key::to_string).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeIndexDataResult {
    pub keys: Vec<Key>,
    pub append_handle: bool,
}

/// 生成一条索引记录的各列键
///
/// `append_handle_if_contains_null` 为真且句柄为整数时，只要任一索引列为 NULL，
/// 就在末尾追加句柄（按 BIGINT 编码），使得唯一索引中含 NULL 的行互不冲突。
pub fn encode_index_data_values(
    row: &Row,
    index_columns: &[IndexColumn],
    handle: &Handle,
    append_handle_if_contains_null: bool,
    table_info: &TableInfo,
) -> CodecResult<EncodeIndexDataResult> {
    let column_types = index_columns
        .iter()
        .map(|col| {
            table_info
                .column(col.offset)
                .map(|c| c.data_type)
                .ok_or_else(|| {
                    CodecError::InvalidInput(format!(
                        "index column {} at offset {} not found in table {}",
                        col.name, col.offset, table_info.name
                    ))
                })
        })
        .collect::<CodecResult<Vec<DataType>>>()?;

    let append_handle = match handle {
        Handle::Int(_) if append_handle_if_contains_null => {
            index_columns.iter().any(|col| row.is_null(col.offset))
        }
        _ => false,
    };

    let mut keys = Vec::with_capacity(index_columns.len() + usize::from(append_handle));
    for (col, tp) in index_columns.iter().zip(&column_types) {
        let value = row.get(col.offset).unwrap_or(&Value::Null);
        keys.push(to_typed_key_with_prefix(value, tp, col.length)?);
    }
    if let Handle::Int(h) = handle {
        if append_handle {
            trace!("index values contain NULL, appending handle {}", h);
            keys.push(to_typed_key(&Value::Int(*h), &DataType::BIGINT)?);
        }
    }

    Ok(EncodeIndexDataResult {
        keys,
        append_handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::datum::INT_FLAG;
    use crate::core::schema::ColumnInfo;
    use crate::core::types::TypeKind;

    fn table() -> TableInfo {
        TableInfo::new(
            5,
            "t",
            vec![
                ColumnInfo::new(1, "id", 0, DataType::BIGINT).primary_key(),
                ColumnInfo::new(2, "a", 1, DataType::BIGINT),
                ColumnInfo::new(3, "b", 2, DataType::new(TypeKind::Varchar)),
            ],
        )
        .pk_is_handle()
    }

    #[test]
    fn test_index_key_layout() {
        let key = IndexKey::new(5, 2, vec![Key::new(vec![0xaa, 0xbb])]);
        let mut expected = vec![b't'];
        expected.extend_from_slice(&[0x80, 0, 0, 0, 0, 0, 0, 5]);
        expected.extend_from_slice(b"_i");
        expected.extend_from_slice(&[0x80, 0, 0, 0, 0, 0, 0, 2]);
        expected.extend_from_slice(&[0xaa, 0xbb]);
        assert_eq!(key.as_bytes(), expected.as_slice());
        assert_eq!(key.table_id(), 5);
        assert_eq!(key.index_id(), 2);
        assert_eq!(key.to_string(), "[aabb]");
    }

    #[test]
    fn test_decode_prefix() {
        let key = IndexKey::new(-3, 9, vec![Key::new(vec![1])]);
        let (table_id, index_id, rest) = IndexKey::decode_prefix(key.as_bytes()).unwrap();
        assert_eq!((table_id, index_id, rest), (-3, 9, &[1u8][..]));

        let mut bad = key.as_bytes().to_vec();
        bad[9] = b'_';
        bad[10] = b'r';
        assert!(matches!(IndexKey::decode_prefix(&bad), Err(CodecError::MalformedKey(_))));
        assert!(matches!(IndexKey::decode_prefix(b"t"), Err(CodecError::MalformedKey(_))));
    }

    #[test]
    fn test_try_new_rejects_missing_component() {
        let err = IndexKey::try_new(1, 1, vec![Some(Key::new(vec![1])), None]);
        assert!(matches!(err, Err(CodecError::MalformedKey(_))));
        let ok = IndexKey::try_new(1, 1, vec![Some(Key::new(vec![1]))]).unwrap();
        assert_eq!(ok.data_keys().len(), 1);
    }

    #[test]
    fn test_append_handle_only_when_null_present() {
        let table = table();
        let cols = vec![IndexColumn::new("a", 1), IndexColumn::new("b", 2)];
        let row = Row::new(vec![Value::Int(1), Value::Int(10), Value::Null]);

        let res = encode_index_data_values(&row, &cols, &Handle::Int(1), true, &table).unwrap();
        assert!(res.append_handle);
        assert_eq!(res.keys.len(), 3);
        assert_eq!(res.keys[2].as_bytes()[0], INT_FLAG);

        let res = encode_index_data_values(&row, &cols, &Handle::Int(1), false, &table).unwrap();
        assert!(!res.append_handle);
        assert_eq!(res.keys.len(), 2);

        let full = Row::new(vec![Value::Int(1), Value::Int(10), Value::from("x")]);
        let res = encode_index_data_values(&full, &cols, &Handle::Int(1), true, &table).unwrap();
        assert!(!res.append_handle);
    }

    #[test]
    fn test_common_handle_never_appended() {
        let table = table();
        let cols = vec![IndexColumn::new("b", 2)];
        let row = Row::new(vec![Value::Int(1), Value::Int(10), Value::Null]);
        let res =
            encode_index_data_values(&row, &cols, &Handle::common(vec![1, 2]), true, &table).unwrap();
        assert!(!res.append_handle);
        assert_eq!(res.keys.len(), 1);
    }

    #[test]
    fn test_unknown_index_column() {
        let table = table();
        let cols = vec![IndexColumn::new("missing", 7)];
        let row = Row::new(vec![Value::Int(1)]);
        let err = encode_index_data_values(&row, &cols, &Handle::Int(1), false, &table);
        assert!(matches!(err, Err(CodecError::InvalidInput(_))));
    }
}
