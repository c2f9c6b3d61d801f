//! TypedKey - 单个类型化值的可比较键

use crate::core::codec::buffer::CodecWriter;
use crate::core::codec::datum;
use crate::core::codec::error::CodecResult;
use crate::core::types::{DataType, UNSPECIFIED_LEN};
use crate::core::value::Value;

use super::Key;

pub fn to_typed_key(value: &Value, tp: &DataType) -> CodecResult<Key> {
    to_typed_key_with_prefix(value, tp, UNSPECIFIED_LEN)
}

/// 前缀索引：先按列类型截断值（字符或字节），再做可比较编码
pub fn to_typed_key_with_prefix(value: &Value, tp: &DataType, prefix_len: i64) -> CodecResult<Key> {
    let mut w = CodecWriter::new();
    datum::encode_key_with_prefix(&mut w, value, tp, prefix_len)?;
    Ok(Key::new(w.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TypeKind;

    #[test]
    fn test_typed_key_order_follows_value_order() {
        let int_keys: Vec<Key> = [i64::MIN, -7, 0, 7, i64::MAX]
            .iter()
            .map(|v| to_typed_key(&Value::Int(*v), &DataType::BIGINT).unwrap())
            .collect();
        assert!(int_keys.windows(2).all(|w| w[0] < w[1]));

        let tp = DataType::new(TypeKind::Varchar);
        let str_keys: Vec<Key> = ["", "a", "ab", "abcdefghij", "b"]
            .iter()
            .map(|v| to_typed_key(&Value::from(*v), &tp).unwrap())
            .collect();
        assert!(str_keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_null_sorts_first() {
        let null = to_typed_key(&Value::Null, &DataType::BIGINT).unwrap();
        let min = to_typed_key(&Value::Int(i64::MIN), &DataType::BIGINT).unwrap();
        assert_eq!(null.as_bytes(), &[datum::NULL_FLAG]);
        assert!(null < min);
    }

    #[test]
    fn test_prefix_key_groups_values() {
        let tp = DataType::new(TypeKind::Varchar);
        let a = to_typed_key_with_prefix(&Value::from("prefix-one"), &tp, 6).unwrap();
        let b = to_typed_key_with_prefix(&Value::from("prefix-two"), &tp, 6).unwrap();
        assert_eq!(a, b);
    }
}
