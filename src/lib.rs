//! tidb-codec - TiDB/TiKV compatible table codec
//!
//! This crate encodes and decodes table rows, row keys and index keys in the
//! byte formats TiDB stores in TiKV, so a client can read and write table data
//! directly against the key-value layer.

pub mod config;
pub mod core;
pub mod utils;

pub use crate::core::*;
