use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

// 导入库模块
use tidb_codec::config::CodecConfig;
use tidb_codec::core::codec::{detect_row_format, CodecError, CodecResult, RowFormat, TableCodec};
use tidb_codec::core::key::{to_typed_key, IndexKey};
use tidb_codec::core::{DataType, Handle, TableInfo, Value};
use tidb_codec::utils::{decode_hex, encode_hex, logging};

#[derive(Parser)]
#[clap(version = "0.1.0", author = "TiDB Codec Contributors")]
struct Cli {
    /// Path to a TOML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a hex row value with a JSON table descriptor
    DecodeRow {
        #[clap(short, long)]
        schema: PathBuf,
        /// Integer handle of the row
        #[clap(long, conflicts_with = "common_handle")]
        handle: Option<i64>,
        /// Hex encoded common handle of the row
        #[clap(long)]
        common_handle: Option<String>,
        value: String,
    },
    /// Encode a JSON array of values into a row value
    EncodeRow {
        #[clap(short, long)]
        schema: PathBuf,
        /// Row format, defaults to the configured one
        #[clap(short, long)]
        format: Option<RowFormatArg>,
        values: PathBuf,
    },
    /// Build an index key from BIGINT column values
    IndexKey {
        #[clap(long, allow_hyphen_values = true)]
        table_id: i64,
        #[clap(long, allow_hyphen_values = true)]
        index_id: i64,
        #[clap(long = "int", allow_hyphen_values = true)]
        ints: Vec<i64>,
    },
    /// Decode the handle stored in a unique index value
    DecodeHandle {
        #[clap(long)]
        common: bool,
        value: String,
    },
    /// Print the row format of a hex row value
    Detect { value: String },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RowFormatArg {
    V1,
    V2,
}

impl From<RowFormatArg> for RowFormat {
    fn from(arg: RowFormatArg) -> Self {
        match arg {
            RowFormatArg::V1 => RowFormat::V1,
            RowFormatArg::V2 => RowFormat::V2,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    };
    logging::init(&config.log)?;

    let result = run(cli.command, &config);
    if let Err(e) = &result {
        log::error!("command failed: {}", e);
    }
    logging::shutdown();
    result.map_err(Into::into)
}

fn run(command: Command, config: &CodecConfig) -> CodecResult<()> {
    match command {
        Command::DecodeRow {
            schema,
            handle,
            common_handle,
            value,
        } => {
            let table = load_table(&schema)?;
            let handle = row_handle(&table, handle, common_handle.as_deref())?;
            let bytes = decode_hex(&value)?;
            println!("format: {}", detect_row_format(&bytes)?);
            let row = TableCodec::decode_row(&bytes, &handle, &table)?;
            for (col, v) in table.columns.iter().zip(row.values()) {
                println!("{} = {}", col.name, v);
            }
        }
        Command::EncodeRow {
            schema,
            format,
            values,
        } => {
            let table = load_table(&schema)?;
            let content = fs::read_to_string(&values)?;
            let values: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
                CodecError::InvalidInput(format!("invalid values {}: {}", values.display(), e))
            })?;
            let format = format.map(RowFormat::from).unwrap_or(config.row_format);
            let bytes = TableCodec::encode_row(&table.columns, &values, table.pk_is_handle, format)?;
            println!("{}", encode_hex(&bytes));
        }
        Command::IndexKey {
            table_id,
            index_id,
            ints,
        } => {
            let keys = ints
                .iter()
                .map(|v| to_typed_key(&Value::Int(*v), &DataType::BIGINT))
                .collect::<CodecResult<Vec<_>>>()?;
            let key = IndexKey::new(table_id, index_id, keys);
            println!("{}", encode_hex(key.as_bytes()));
        }
        Command::DecodeHandle { common, value } => {
            let handle = TableCodec::decode_handle(&decode_hex(&value)?, common)?;
            println!("{}", handle);
        }
        Command::Detect { value } => {
            println!("{}", detect_row_format(&decode_hex(&value)?)?);
        }
    }
    Ok(())
}

/// 主键即句柄或聚簇表的行必须给出句柄，否则句柄列无从还原
fn row_handle(table: &TableInfo, handle: Option<i64>, common_handle: Option<&str>) -> CodecResult<Handle> {
    match (handle, common_handle) {
        (_, Some(hex)) => Ok(Handle::common(decode_hex(hex)?)),
        (Some(h), None) => Ok(Handle::Int(h)),
        (None, None) if table.pk_is_handle || table.is_common_handle => Err(CodecError::InvalidInput(
            format!("table {} stores its primary key in the handle; pass --handle or --common-handle", table.name),
        )),
        (None, None) => Ok(Handle::Int(0)),
    }
}

fn load_table(path: &Path) -> CodecResult<TableInfo> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CodecError::InvalidInput(format!("invalid table descriptor {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidb_codec::core::ColumnInfo;

    fn table() -> TableInfo {
        TableInfo::new(1, "t", vec![ColumnInfo::new(1, "id", 0, DataType::BIGINT).primary_key()])
    }

    #[test]
    fn test_row_handle_required_for_pk_handle_table() {
        let err = row_handle(&table().pk_is_handle(), None, None);
        assert!(matches!(err, Err(CodecError::InvalidInput(_))));
        let err = row_handle(&table().common_handle(), None, None);
        assert!(matches!(err, Err(CodecError::InvalidInput(_))));

        assert_eq!(row_handle(&table().pk_is_handle(), Some(9), None).unwrap(), Handle::Int(9));
        assert_eq!(
            row_handle(&table().common_handle(), None, Some("0x0102")).unwrap(),
            Handle::common(vec![1, 2])
        );
        assert_eq!(row_handle(&table(), None, None).unwrap(), Handle::Int(0));
    }
}
