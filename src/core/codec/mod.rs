//! Codec 模块 - 表数据二进制编解码
//!
//! 与 TiDB/TiKV 存储格式逐字节兼容的行值、索引值编解码
//!
//! ## 架构
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         codec::table_codec          │
//! │   行编解码入口、句柄与索引值编码     │
//! └─────────────────────────────────────┘
//!              │
//!       ┌──────┴──────┐
//!       ▼             ▼
//!   ┌────────┐   ┌────────┐
//!   │row_v1  │   │row_v2  │
//!   └────────┘   └────────┘
//!       │             │
//!       ▼             ▼
//!   ┌────────┐   ┌─────────────────────┐
//!   │datum   │──▶│number / bytes / json│
//!   └────────┘   └─────────────────────┘
//!                       │
//!                       ▼
//!                  ┌────────┐
//!                  │buffer  │
//!                  └────────┘
//! ```
//!
//! ## 行格式
//!
//! - 旧格式（v1）：`(列 ID, 列值)` datum 序列，无头部
//! - 新格式（v2）：首字节 `0x80`，头部含列 ID 表与偏移表，列值紧凑存储
//!
//! ## 使用示例
//!
//! ```ignore
//! use tidb_codec::core::codec::{TableCodec, RowFormat};
//!
//! let bytes = TableCodec::encode_row(&table.columns, &values, table.pk_is_handle, RowFormat::V2)?;
//! let row = TableCodec::decode_row(&bytes, &Handle::Int(1), &table)?;
//! ```

pub mod buffer;
pub mod bytes;
pub mod datum;
pub mod error;
pub mod json;
pub mod number;
pub mod row_v1;
pub mod row_v2;
pub mod table_codec;

pub use buffer::{CodecReader, CodecWriter};
pub use error::{CodecError, CodecResult};
pub use table_codec::{
    decode_handle, decode_row, detect_row_format, encode_handle_in_unique_index_value,
    encode_row, gen_index_value_for_clustered_index_version1, RowFormat, TableCodec,
    CODEC_VER,
};
