//! 列类型描述
//!
//! 与 TiDB 的 MySQL 列类型对应，决定列值的可比较编码、值编码以及
//! 前缀索引的截断规则。

use serde::{Deserialize, Serialize};

/// 未指定长度（前缀索引中表示不截断）
pub const UNSPECIFIED_LEN: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Year,
    Float,
    Double,
    Decimal,
    Char,
    Varchar,
    Text,
    Binary,
    Varbinary,
    Blob,
    Date,
    DateTime,
    Timestamp,
    Time,
    Bit,
    Enum,
    Set,
    Json,
}

/// 编码族：同一编码族的类型共享 datum 标记和编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFamily {
    Int,
    Uint,
    Float,
    Bytes,
    Time,
    Duration,
    Decimal,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    pub kind: TypeKind,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default = "default_len")]
    pub length: i64,
    /// DECIMAL 的小数位数
    #[serde(default = "default_len")]
    pub decimal: i64,
}

fn default_len() -> i64 {
    UNSPECIFIED_LEN
}

impl DataType {
    pub const BIGINT: DataType = DataType::new(TypeKind::BigInt);

    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            unsigned: false,
            length: UNSPECIFIED_LEN,
            decimal: UNSPECIFIED_LEN,
        }
    }

    /// `DECIMAL(precision, frac)`
    pub const fn decimal(precision: i64, frac: i64) -> Self {
        Self::new(TypeKind::Decimal).with_length(precision).with_decimal(frac)
    }

    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub const fn with_length(mut self, length: i64) -> Self {
        self.length = length;
        self
    }

    pub const fn with_decimal(mut self, decimal: i64) -> Self {
        self.decimal = decimal;
        self
    }

    pub fn family(&self) -> EncodingFamily {
        match self.kind {
            TypeKind::TinyInt
            | TypeKind::SmallInt
            | TypeKind::MediumInt
            | TypeKind::Int
            | TypeKind::BigInt => {
                if self.unsigned {
                    EncodingFamily::Uint
                } else {
                    EncodingFamily::Int
                }
            }
            TypeKind::Year => EncodingFamily::Int,
            TypeKind::Bit | TypeKind::Enum | TypeKind::Set => EncodingFamily::Uint,
            TypeKind::Float | TypeKind::Double => EncodingFamily::Float,
            TypeKind::Char
            | TypeKind::Varchar
            | TypeKind::Text
            | TypeKind::Binary
            | TypeKind::Varbinary
            | TypeKind::Blob => EncodingFamily::Bytes,
            TypeKind::Date | TypeKind::DateTime | TypeKind::Timestamp => EncodingFamily::Time,
            TypeKind::Time => EncodingFamily::Duration,
            TypeKind::Decimal => EncodingFamily::Decimal,
            TypeKind::Json => EncodingFamily::Json,
        }
    }

    /// 字符类型按字符截断前缀，二进制类型按字节截断
    pub fn is_text(&self) -> bool {
        matches!(self.kind, TypeKind::Char | TypeKind::Varchar | TypeKind::Text)
    }

    pub fn name(&self) -> String {
        let base = format!("{:?}", self.kind).to_lowercase();
        if self.unsigned {
            format!("{} unsigned", base)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_dispatch() {
        assert_eq!(DataType::BIGINT.family(), EncodingFamily::Int);
        assert_eq!(DataType::new(TypeKind::Int).unsigned().family(), EncodingFamily::Uint);
        assert_eq!(DataType::new(TypeKind::Enum).family(), EncodingFamily::Uint);
        assert_eq!(DataType::new(TypeKind::Varchar).family(), EncodingFamily::Bytes);
        assert_eq!(DataType::new(TypeKind::Timestamp).family(), EncodingFamily::Time);
        assert_eq!(DataType::new(TypeKind::Time).family(), EncodingFamily::Duration);
        assert_eq!(DataType::decimal(10, 2).family(), EncodingFamily::Decimal);
        assert_eq!(DataType::new(TypeKind::Json).family(), EncodingFamily::Json);
    }

    #[test]
    fn test_deserialize_defaults() {
        let tp: DataType = serde_json::from_str(r#"{"kind":"varchar"}"#).unwrap();
        assert_eq!(tp, DataType::new(TypeKind::Varchar));
        assert_eq!(tp.name(), "varchar");
        let tp: DataType = serde_json::from_str(r#"{"kind":"big_int","unsigned":true}"#).unwrap();
        assert_eq!(tp.name(), "bigint unsigned");
        let tp: DataType =
            serde_json::from_str(r#"{"kind":"decimal","length":10,"decimal":2}"#).unwrap();
        assert_eq!(tp, DataType::decimal(10, 2));
    }
}
