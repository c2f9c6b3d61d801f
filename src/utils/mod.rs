// 工具模块 - 仅用于导出各个子模块，不包含具体实现

// 日志模块
pub mod logging;

// 十六进制工具模块
pub mod hex;
pub use hex::{decode_hex, encode_hex};
