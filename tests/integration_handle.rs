//! 句柄与索引值集成测试
//!
//! 测试范围:
//! - 唯一索引值中整数句柄与公共句柄的往返
//! - 聚簇索引值布局
//! - 聚簇表的行编解码

mod common;

use common::assertions::{assert_corrupt, assert_ok};
use common::data_fixtures::clustered_table;
use common::ALL_FORMATS;

use proptest::prelude::*;
use tidb_codec::core::codec::table_codec::{COMMON_HANDLE_FLAG, INDEX_VERSION_FLAG};
use tidb_codec::core::codec::{
    decode_handle, decode_row, encode_handle_in_unique_index_value, encode_row,
    gen_index_value_for_clustered_index_version1, CodecError,
};
use tidb_codec::core::{CommonHandle, DataType, Handle, TypeKind, Value};

#[test]
fn test_int_handle_boundaries() {
    for v in [i64::MIN, -1, 0, 1, i64::MAX] {
        let raw = encode_handle_in_unique_index_value(&Handle::Int(v));
        assert_eq!(raw, v.to_be_bytes().to_vec());
        assert_eq!(assert_ok(decode_handle(&raw, false)), Handle::Int(v));
    }
}

#[test]
fn test_short_int_handle_is_corrupt() {
    assert_corrupt(decode_handle(&[], false));
    assert_corrupt(decode_handle(&[0, 0, 0, 0, 0, 0, 1], false));
}

#[test]
fn test_clustered_index_value_round_trip() {
    let table = clustered_table();
    let index = table.index(1).expect("primary index should exist");
    let handle = Handle::from(assert_ok(CommonHandle::from_values(&[(
        Value::from("sku-42"),
        DataType::new(TypeKind::Varchar),
    )])));

    let value = assert_ok(gen_index_value_for_clustered_index_version1(index, &handle));
    assert_eq!(&value[..4], &[0, INDEX_VERSION_FLAG, 1, COMMON_HANDLE_FLAG]);
    let len = u16::from_be_bytes([value[4], value[5]]) as usize;
    assert_eq!(len, value.len() - 6);
    assert_eq!(assert_ok(decode_handle(&value[6..], true)), handle);
}

#[test]
fn test_clustered_table_rows_store_primary_key() {
    let table = clustered_table();
    let values = vec![Value::from("sku-1"), Value::Int(12)];
    let handle = Handle::from(assert_ok(CommonHandle::from_values(&[(
        values[0].clone(),
        table.columns[0].data_type,
    )])));
    for format in ALL_FORMATS {
        let bytes = assert_ok(encode_row(&table.columns, &values, table.pk_is_handle, format));
        let row = assert_ok(decode_row(&bytes, &handle, &table));
        assert_eq!(row.values(), values.as_slice());
    }
}

#[test]
fn test_int_handle_rejected_for_clustered_index_value() {
    let table = clustered_table();
    let index = table.index(1).expect("primary index should exist");
    let result = gen_index_value_for_clustered_index_version1(index, &Handle::Int(1));
    assert!(matches!(result, Err(CodecError::InvalidInput(_))));
}

proptest! {
    #[test]
    fn int_handle_round_trip(v in any::<i64>()) {
        let raw = encode_handle_in_unique_index_value(&Handle::Int(v));
        prop_assert_eq!(decode_handle(&raw, false).unwrap(), Handle::Int(v));
    }

    #[test]
    fn common_handle_round_trip(bytes in prop::collection::vec(any::<u8>(), 1..64)) {
        let raw = encode_handle_in_unique_index_value(&Handle::common(bytes.clone()));
        prop_assert_eq!(raw.clone(), bytes.clone());
        prop_assert_eq!(decode_handle(&raw, true).unwrap(), Handle::common(bytes));
    }
}
