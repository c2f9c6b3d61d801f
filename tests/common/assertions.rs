//! 自定义断言辅助模块
//!
//! 提供测试中的常用断言函数

use tidb_codec::core::codec::CodecError;

/// 断言结果成功，返回内部值
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    result.expect("操作应该成功")
}

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言结果为 ValueCorrupt 错误
pub fn assert_corrupt<T: std::fmt::Debug>(result: Result<T, CodecError>) {
    match result {
        Err(CodecError::ValueCorrupt(_)) => {}
        other => panic!("期望 ValueCorrupt 错误, 实际是 {:?}", other),
    }
}

/// 断言字节串严格递增
pub fn assert_strictly_ascending(keys: &[Vec<u8>]) {
    for pair in keys.windows(2) {
        assert!(
            pair[0] < pair[1],
            "键顺序错误: {:02x?} 应小于 {:02x?}",
            pair[0],
            pair[1]
        );
    }
}
