//! TableCodec - 行与索引值编解码入口
//!
//! 编码时由调用方指定行格式，解码时按首字节识别：`0x80` 为新格式，其余为旧格式。

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::core::handle::Handle;
use crate::core::row::Row;
use crate::core::schema::{ColumnInfo, IndexInfo, TableInfo};
use crate::core::value::Value;

use super::buffer::{CodecReader, CodecWriter};
use super::datum::NULL_FLAG;
use super::error::{CodecError, CodecResult};
use super::{row_v1, row_v2};

pub use super::row_v2::CODEC_VER;

/// 聚簇索引值版本标记
pub const INDEX_VERSION_FLAG: u8 = 125;
/// 聚簇索引值中公共句柄段的标记
pub const COMMON_HANDLE_FLAG: u8 = 127;
const CLUSTERED_INDEX_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFormat {
    V1,
    #[default]
    V2,
}

impl std::fmt::Display for RowFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowFormat::V1 => write!(f, "v1"),
            RowFormat::V2 => write!(f, "v2"),
        }
    }
}

pub fn detect_row_format(value: &[u8]) -> CodecResult<RowFormat> {
    match value.first() {
        None => Err(CodecError::corrupt("empty row value")),
        Some(&CODEC_VER) => Ok(RowFormat::V2),
        Some(_) => Ok(RowFormat::V1),
    }
}

pub struct TableCodec;

impl TableCodec {
    /// 编码一行；主键即句柄时跳过主键列
    pub fn encode_row(
        columns: &[ColumnInfo],
        values: &[Value],
        is_pk_handle: bool,
        format: RowFormat,
    ) -> CodecResult<Vec<u8>> {
        if columns.len() != values.len() {
            return Err(CodecError::SchemaMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        match format {
            RowFormat::V1 => row_v1::encode_row(columns, values, is_pk_handle),
            RowFormat::V2 => row_v2::encode_row(columns, values, is_pk_handle),
        }
    }

    pub fn decode_row(value: &[u8], handle: &Handle, table_info: &TableInfo) -> CodecResult<Row> {
        let format = detect_row_format(value)?;
        trace!(
            "decoding {} bytes of {} row for table {} handle {}",
            value.len(),
            format,
            table_info.id,
            handle
        );
        match format {
            RowFormat::V1 => row_v1::decode_row(value, handle, table_info),
            RowFormat::V2 => row_v2::decode_row(value, handle, table_info),
        }
    }

    /// 从唯一索引值中还原句柄
    pub fn decode_handle(value: &[u8], is_common_handle: bool) -> CodecResult<Handle> {
        if is_common_handle {
            return Ok(Handle::common(value));
        }
        let mut r = CodecReader::new(value);
        let handle = r
            .read_i64_be()
            .map_err(|_| CodecError::corrupt(format!("int handle needs 8 bytes, got {}", value.len())))?;
        if !r.eof() {
            warn!("ignoring {} trailing bytes after int handle", r.remaining().len());
        }
        Ok(Handle::Int(handle))
    }

    pub fn encode_handle_in_unique_index_value(handle: &Handle) -> Vec<u8> {
        handle.raw_bytes()
    }

    /// 聚簇表唯一索引的值：`[0][版本标记][1][公共句柄标记][u16 BE 长度][句柄]`
    pub fn gen_index_value_for_clustered_index_version1(
        index: &IndexInfo,
        handle: &Handle,
    ) -> CodecResult<Vec<u8>> {
        if !index.unique {
            return Err(CodecError::InvalidInput(format!(
                "index {} is not unique",
                index.name
            )));
        }
        let encoded = match handle {
            Handle::Common(h) => h.encoded(),
            Handle::Int(_) => {
                return Err(CodecError::InvalidInput(
                    "clustered index value requires a common handle".to_string(),
                ))
            }
        };
        let len = u16::try_from(encoded.len()).map_err(|_| {
            CodecError::InvalidInput(format!("common handle too long: {} bytes", encoded.len()))
        })?;

        let mut w = CodecWriter::with_capacity(6 + encoded.len());
        w.write_u8(NULL_FLAG);
        w.write_u8(INDEX_VERSION_FLAG);
        w.write_u8(CLUSTERED_INDEX_VERSION);
        w.write_u8(COMMON_HANDLE_FLAG);
        w.write_u16_be(len);
        w.write_bytes(encoded);
        Ok(w.into_inner())
    }
}

pub fn encode_row(
    columns: &[ColumnInfo],
    values: &[Value],
    is_pk_handle: bool,
    format: RowFormat,
) -> CodecResult<Vec<u8>> {
    TableCodec::encode_row(columns, values, is_pk_handle, format)
}

pub fn decode_row(value: &[u8], handle: &Handle, table_info: &TableInfo) -> CodecResult<Row> {
    TableCodec::decode_row(value, handle, table_info)
}

pub fn decode_handle(value: &[u8], is_common_handle: bool) -> CodecResult<Handle> {
    TableCodec::decode_handle(value, is_common_handle)
}

pub fn encode_handle_in_unique_index_value(handle: &Handle) -> Vec<u8> {
    TableCodec::encode_handle_in_unique_index_value(handle)
}

pub fn gen_index_value_for_clustered_index_version1(
    index: &IndexInfo,
    handle: &Handle,
) -> CodecResult<Vec<u8>> {
    TableCodec::gen_index_value_for_clustered_index_version1(index, handle)
}

/// 主键即句柄的列不落盘，解码时由整数句柄补回
pub(crate) fn handle_column_value(handle: &Handle, col: &ColumnInfo) -> CodecResult<Value> {
    match handle {
        Handle::Int(h) if col.data_type.unsigned => Ok(Value::UInt(*h as u64)),
        Handle::Int(h) => Ok(Value::Int(*h)),
        Handle::Common(_) => Err(CodecError::InvalidInput(format!(
            "column {} is the int handle but a common handle was supplied",
            col.name
        ))),
    }
}
