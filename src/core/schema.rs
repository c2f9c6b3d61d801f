//! 表结构描述
//!
//! 列、索引和表的元数据由调用方提供，编解码层只读使用。

use serde::{Deserialize, Serialize};

use crate::core::types::{DataType, UNSPECIFIED_LEN};
use crate::core::value::Value;

/// 列定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub id: i64,
    pub name: String,
    /// 在表列列表中的位置
    pub offset: usize,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub primary_key: bool,
    /// 虚拟生成列不落盘
    #[serde(default)]
    pub virtual_generated: bool,
    /// 行中缺失该列时使用的原始默认值
    #[serde(default)]
    pub origin_default: Option<Value>,
}

impl ColumnInfo {
    pub fn new(id: i64, name: impl Into<String>, offset: usize, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            offset,
            data_type,
            primary_key: false,
            virtual_generated: false,
            origin_default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn virtual_generated(mut self) -> Self {
        self.virtual_generated = true;
        self
    }

    pub fn origin_default(mut self, value: Value) -> Self {
        self.origin_default = Some(value);
        self
    }

    /// 整数主键即句柄时，该列的值可由句柄恢复，不需要存储
    pub fn is_handle_column(&self, is_pk_handle: bool) -> bool {
        is_pk_handle && self.primary_key
    }
}

/// 索引列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    pub offset: usize,
    /// 前缀索引长度，`UNSPECIFIED_LEN` 表示整列
    #[serde(default = "unspecified_len")]
    pub length: i64,
}

fn unspecified_len() -> i64 {
    UNSPECIFIED_LEN
}

impl IndexColumn {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            length: UNSPECIFIED_LEN,
        }
    }

    pub fn with_prefix(mut self, length: i64) -> Self {
        self.length = length;
        self
    }
}

/// 索引定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub id: i64,
    pub name: String,
    pub columns: Vec<IndexColumn>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
}

impl IndexInfo {
    pub fn new(id: i64, name: impl Into<String>, columns: Vec<IndexColumn>) -> Self {
        Self {
            id,
            name: name.into(),
            columns,
            unique: false,
            primary: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.unique = true;
        self
    }
}

/// 表定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: i64,
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub indices: Vec<IndexInfo>,
    /// 单列整数主键直接作为行句柄
    #[serde(default)]
    pub pk_is_handle: bool,
    /// 聚簇表，行句柄由主键列编码而成
    #[serde(default)]
    pub is_common_handle: bool,
}

impl TableInfo {
    pub fn new(id: i64, name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            id,
            name: name.into(),
            columns,
            indices: Vec::new(),
            pk_is_handle: false,
            is_common_handle: false,
        }
    }

    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.indices.push(index);
        self
    }

    pub fn pk_is_handle(mut self) -> Self {
        self.pk_is_handle = true;
        self
    }

    pub fn common_handle(mut self) -> Self {
        self.is_common_handle = true;
        self
    }

    pub fn column(&self, offset: usize) -> Option<&ColumnInfo> {
        self.columns.get(offset)
    }

    pub fn column_by_id(&self, id: i64) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn index(&self, id: i64) -> Option<&IndexInfo> {
        self.indices.iter().find(|i| i.id == id)
    }

    pub fn pk_handle_column(&self) -> Option<&ColumnInfo> {
        if !self.pk_is_handle {
            return None;
        }
        self.columns.iter().find(|c| c.primary_key)
    }
}
