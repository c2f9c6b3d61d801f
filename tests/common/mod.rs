//! 集成测试共享工具模块
//!
//! 提供测试表结构、测试数据和断言辅助函数，供所有集成测试使用

#![allow(dead_code)]

pub mod assertions;
pub mod data_fixtures;

use tidb_codec::core::codec::RowFormat;

/// 两种行格式都需要覆盖的测试用例使用
pub const ALL_FORMATS: [RowFormat; 2] = [RowFormat::V1, RowFormat::V2];
