//! Handle - 行句柄
//!
//! 单列整数主键（或隐式行 ID）的表使用 `Handle::Int`，
//! 聚簇表使用由主键列可比较编码拼接而成的 `Handle::Common`。

use std::fmt;

use crate::core::codec::buffer::CodecWriter;
use crate::core::codec::datum;
use crate::core::codec::error::{CodecError, CodecResult};
use crate::core::codec::number::encode_comparable_i64;
use crate::core::types::DataType;
use crate::core::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommonHandle {
    encoded: Vec<u8>,
}

impl CommonHandle {
    pub fn new(encoded: Vec<u8>) -> Self {
        Self { encoded }
    }

    /// 由主键列值构造，逐列写入可比较编码
    pub fn from_values(values: &[(Value, DataType)]) -> CodecResult<Self> {
        if values.is_empty() {
            return Err(CodecError::InvalidInput(
                "common handle needs at least one column".to_string(),
            ));
        }
        let mut w = CodecWriter::new();
        for (value, tp) in values {
            if value.is_null() {
                return Err(CodecError::InvalidInput(
                    "common handle column cannot be NULL".to_string(),
                ));
            }
            datum::encode_key(&mut w, value, tp)?;
        }
        Ok(Self::new(w.into_inner()))
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
    Int(i64),
    Common(CommonHandle),
}

impl Handle {
    pub fn common(encoded: impl Into<Vec<u8>>) -> Self {
        Handle::Common(CommonHandle::new(encoded.into()))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Handle::Int(_))
    }

    pub fn int_value(&self) -> Option<i64> {
        match self {
            Handle::Int(v) => Some(*v),
            Handle::Common(_) => None,
        }
    }

    /// 存放在唯一索引值中的原始字节：整数句柄为 8 字节大端补码
    pub fn raw_bytes(&self) -> Vec<u8> {
        match self {
            Handle::Int(v) => v.to_be_bytes().to_vec(),
            Handle::Common(h) => h.encoded().to_vec(),
        }
    }

    /// 行键中使用的可比较字节
    pub fn encoded(&self) -> Vec<u8> {
        match self {
            Handle::Int(v) => encode_comparable_i64(*v).to_be_bytes().to_vec(),
            Handle::Common(h) => h.encoded().to_vec(),
        }
    }
}

impl From<i64> for Handle {
    fn from(v: i64) -> Self {
        Handle::Int(v)
    }
}

impl From<CommonHandle> for Handle {
    fn from(h: CommonHandle) -> Self {
        Handle::Common(h)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Int(v) => write!(f, "{}", v),
            Handle::Common(h) => {
                write!(f, "{{")?;
                for b in h.encoded() {
                    write!(f, "{:02x}", b)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TypeKind;

    #[test]
    fn test_int_handle_bytes() {
        let h = Handle::Int(-2);
        assert!(h.is_int());
        assert_eq!(h.raw_bytes(), vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(h.encoded(), vec![0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]);
        assert!(Handle::Int(-1).encoded() < Handle::Int(1).encoded());
    }

    #[test]
    fn test_common_handle_from_values() {
        let h = CommonHandle::from_values(&[
            (Value::from("a"), DataType::new(TypeKind::Varchar)),
            (Value::Int(1), DataType::BIGINT),
        ])
        .unwrap();
        assert_eq!(h.encoded()[0], datum::BYTES_FLAG);
        assert_eq!(h.encoded().len(), 1 + 9 + 1 + 8);

        let handle = Handle::from(h.clone());
        assert!(!handle.is_int());
        assert_eq!(handle.raw_bytes(), h.encoded());
        assert_eq!(handle.encoded(), h.encoded());
        assert_eq!(handle.int_value(), None);
    }

    #[test]
    fn test_common_handle_rejects_null() {
        let err = CommonHandle::from_values(&[(Value::Null, DataType::BIGINT)]);
        assert!(matches!(err, Err(CodecError::InvalidInput(_))));
        assert!(CommonHandle::from_values(&[]).is_err());
    }
}
