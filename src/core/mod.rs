pub mod codec;
pub mod handle;
pub mod key;
pub mod row;
pub mod schema;
pub mod types;
pub mod value;

// 错误和结果类型
pub use codec::{CodecError, CodecResult};

// 编解码入口
pub use codec::{RowFormat, TableCodec};

// 核心数据类型
pub use handle::{CommonHandle, Handle};
pub use key::{EncodeIndexDataResult, IndexKey, Key, RowKey};
pub use row::Row;
pub use schema::{ColumnInfo, IndexColumn, IndexInfo, TableInfo};
pub use types::{DataType, TypeKind};
pub use value::{MyDecimal, MysqlTime, Value};
