//! 测试数据生成模块
//!
//! 提供各种测试表结构和行数据的生成函数

use tidb_codec::core::{
    ColumnInfo, DataType, IndexColumn, IndexInfo, MyDecimal, MysqlTime, TableInfo, TypeKind, Value,
};

/// 创建用户表：整数主键即句柄，带一个唯一索引和一个普通索引
pub fn users_table() -> TableInfo {
    TableInfo::new(
        5,
        "users",
        vec![
            ColumnInfo::new(1, "id", 0, DataType::BIGINT).primary_key(),
            ColumnInfo::new(2, "name", 1, DataType::new(TypeKind::Varchar)),
            ColumnInfo::new(3, "age", 2, DataType::new(TypeKind::Int)),
            ColumnInfo::new(4, "email", 3, DataType::new(TypeKind::Varchar)),
        ],
    )
    .pk_is_handle()
    .with_index(IndexInfo::new(2, "idx_age", vec![IndexColumn::new("age", 2)]))
    .with_index(
        IndexInfo::new(3, "uk_email", vec![IndexColumn::new("email", 3)]).unique(),
    )
}

/// 创建覆盖所有可编码类型的表，没有主键句柄列
pub fn all_types_table() -> TableInfo {
    TableInfo::new(
        9,
        "all_types",
        vec![
            ColumnInfo::new(1, "c_bigint", 0, DataType::BIGINT),
            ColumnInfo::new(2, "c_uint", 1, DataType::new(TypeKind::Int).unsigned()),
            ColumnInfo::new(3, "c_double", 2, DataType::new(TypeKind::Double)),
            ColumnInfo::new(4, "c_varchar", 3, DataType::new(TypeKind::Varchar)),
            ColumnInfo::new(5, "c_blob", 4, DataType::new(TypeKind::Blob)),
            ColumnInfo::new(6, "c_datetime", 5, DataType::new(TypeKind::DateTime)),
            ColumnInfo::new(7, "c_time", 6, DataType::new(TypeKind::Time)),
            ColumnInfo::new(8, "c_year", 7, DataType::new(TypeKind::Year)),
            ColumnInfo::new(9, "c_enum", 8, DataType::new(TypeKind::Enum)),
            ColumnInfo::new(10, "c_decimal", 9, DataType::decimal(24, 4)),
            ColumnInfo::new(11, "c_json", 10, DataType::new(TypeKind::Json)),
        ],
    )
}

/// 创建聚簇表：字符串主键编码为公共句柄
pub fn clustered_table() -> TableInfo {
    TableInfo::new(
        11,
        "clustered",
        vec![
            ColumnInfo::new(1, "code", 0, DataType::new(TypeKind::Varchar)).primary_key(),
            ColumnInfo::new(2, "qty", 1, DataType::BIGINT),
        ],
    )
    .common_handle()
    .with_index(
        IndexInfo::new(1, "primary", vec![IndexColumn::new("code", 0)]).primary(),
    )
}

/// 用户表的一行
pub fn user_row(id: i64, name: &str, age: Option<i64>, email: Option<&str>) -> Vec<Value> {
    vec![
        Value::Int(id),
        Value::from(name),
        age.map(Value::Int).unwrap_or(Value::Null),
        email.map(Value::from).unwrap_or(Value::Null),
    ]
}

/// all_types 表的一行非空数据
pub fn all_types_row() -> Vec<Value> {
    vec![
        Value::Int(-9_000_000_000),
        Value::UInt(4_000_000_000),
        Value::Float(-12.625),
        Value::from("héllo wörld"),
        Value::Bytes(vec![0, 1, 2, 0xff]),
        Value::Time(MysqlTime::datetime(2023, 12, 31, 23, 59, 58).with_microsecond(123_456)),
        Value::Duration(-3_600_000_000_000),
        Value::Int(2024),
        Value::UInt(3),
        Value::Decimal(decimal("-12345.6789")),
        Value::Json(serde_json::json!({"a": [1, true, null], "b": "x"})),
    ]
}

pub fn decimal(s: &str) -> MyDecimal {
    s.parse().expect("invalid decimal literal")
}
