//! 键 - 不透明的有序字节串
//!
//! 键的相等与大小完全由字节决定，存储层按字节序对索引做范围扫描，
//! 因此每种类型的键编码都必须保持值的自然顺序。

pub mod index_key;
pub mod row_key;
pub mod typed_key;

pub use index_key::{encode_index_data_values, EncodeIndexDataResult, IndexKey};
pub use row_key::RowKey;
pub use typed_key::{to_typed_key, to_typed_key_with_prefix};

use std::fmt;

/// 所有表数据键的前缀
pub const TBL_PREFIX: u8 = b't';
pub const IDX_PREFIX_SEP: [u8; 2] = [b'_', b'i'];
pub const REC_PREFIX_SEP: [u8; 2] = [b'_', b'r'];

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key(Vec<u8>);

impl Key {
    pub fn new(bytes: Vec<u8>) -> Self {
        Key(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// 按字节加一（带进位），用作前缀范围扫描的上界；全 0xff 时追加 0
    pub fn prefix_next(&self) -> Key {
        let mut next = self.0.clone();
        for i in (0..next.len()).rev() {
            next[i] = next[i].wrapping_add(1);
            if next[i] != 0 {
                return Key(next);
            }
        }
        let mut next = self.0.clone();
        next.push(0);
        Key(next)
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Key(bytes)
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_is_byte_order() {
        let a = Key::new(vec![0x01, 0xff]);
        let b = Key::new(vec![0x02]);
        let c = Key::new(vec![0x02, 0x00]);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(Key::new(vec![1, 2]), Key::from(vec![1, 2]));
    }

    #[test]
    fn test_prefix_next() {
        assert_eq!(Key::new(vec![1, 2]).prefix_next(), Key::new(vec![1, 3]));
        assert_eq!(Key::new(vec![1, 0xff]).prefix_next(), Key::new(vec![2, 0]));
        assert_eq!(Key::new(vec![0xff]).prefix_next(), Key::new(vec![0xff, 0]));

        let prefix = Key::new(vec![b't', 1]);
        let inside = Key::new(vec![b't', 1, 0xff, 0xff]);
        assert!(inside.starts_with(&prefix));
        assert!(inside < prefix.prefix_next());
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(Key::new(vec![0x74, 0x0a]).to_string(), "740a");
    }
}
