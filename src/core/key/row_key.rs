//! RowKey - 行数据键
//!
//! 布局：`'t'` + 表 ID（可比较 i64）+ `"_r"` + 句柄的可比较编码。

use crate::core::codec::buffer::{CodecReader, CodecWriter};
use crate::core::codec::error::{CodecError, CodecResult};
use crate::core::codec::number::{read_comparable_i64, write_comparable_i64};
use crate::core::handle::Handle;

use super::{Key, REC_PREFIX_SEP, TBL_PREFIX};

/// 固定前缀长度：1 + 8 + 2
pub const RECORD_PREFIX_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKey {
    key: Key,
    table_id: i64,
    handle: Handle,
}

impl RowKey {
    pub fn new(table_id: i64, handle: Handle) -> Self {
        let mut w = CodecWriter::new();
        Self::write_prefix(&mut w, table_id);
        w.write_bytes(&handle.encoded());
        Self {
            key: Key::new(w.into_inner()),
            table_id,
            handle,
        }
    }

    pub fn record_prefix(table_id: i64) -> Key {
        let mut w = CodecWriter::with_capacity(RECORD_PREFIX_LEN);
        Self::write_prefix(&mut w, table_id);
        Key::new(w.into_inner())
    }

    fn write_prefix(w: &mut CodecWriter, table_id: i64) {
        w.write_u8(TBL_PREFIX);
        write_comparable_i64(w, table_id);
        w.write_bytes(&REC_PREFIX_SEP);
    }

    pub fn decode(bytes: &[u8], is_common_handle: bool) -> CodecResult<Self> {
        if bytes.len() < RECORD_PREFIX_LEN {
            return Err(CodecError::MalformedKey(format!(
                "row key too short: {} bytes",
                bytes.len()
            )));
        }
        let mut r = CodecReader::new(bytes);
        if r.read_u8()? != TBL_PREFIX {
            return Err(CodecError::MalformedKey("missing table prefix".to_string()));
        }
        let table_id = read_comparable_i64(&mut r)?;
        if r.read_bytes(2)? != REC_PREFIX_SEP {
            return Err(CodecError::MalformedKey("missing record separator".to_string()));
        }
        let handle = if is_common_handle {
            if r.eof() {
                return Err(CodecError::MalformedKey("empty common handle".to_string()));
            }
            Handle::common(r.remaining())
        } else {
            let h = read_comparable_i64(&mut r)
                .map_err(|_| CodecError::MalformedKey("truncated int handle".to_string()))?;
            if !r.eof() {
                return Err(CodecError::MalformedKey(format!(
                    "{} trailing bytes after int handle",
                    r.remaining().len()
                )));
            }
            Handle::Int(h)
        };
        Ok(Self {
            key: Key::new(bytes.to_vec()),
            table_id,
            handle,
        })
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_row_key() {
        let key = RowKey::new(5, Handle::Int(7));
        assert_eq!(
            key.as_bytes(),
            &[b't', 0x80, 0, 0, 0, 0, 0, 0, 5, b'_', b'r', 0x80, 0, 0, 0, 0, 0, 0, 7]
        );
        assert!(key.key().starts_with(&RowKey::record_prefix(5)));
        let decoded = RowKey::decode(key.as_bytes(), false).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_common_row_key() {
        let key = RowKey::new(5, Handle::common(vec![1, 2, 3]));
        let decoded = RowKey::decode(key.as_bytes(), true).unwrap();
        assert_eq!(decoded.handle(), &Handle::common(vec![1, 2, 3]));
        assert_eq!(decoded.table_id(), 5);
    }

    #[test]
    fn test_row_keys_sort_by_handle() {
        let a = RowKey::new(1, Handle::Int(-5));
        let b = RowKey::new(1, Handle::Int(3));
        let c = RowKey::new(2, Handle::Int(i64::MIN));
        assert!(a.key() < b.key());
        assert!(b.key() < c.key());
    }

    #[test]
    fn test_malformed_row_keys() {
        let key = RowKey::new(5, Handle::Int(7));
        assert!(RowKey::decode(&key.as_bytes()[..15], false).is_err());
        assert!(RowKey::decode(b"x", false).is_err());
        assert!(RowKey::decode(RowKey::record_prefix(5).as_bytes(), true).is_err());
    }
}
