use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::codec::RowFormat;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CodecConfig {
    /// 编码新行时使用的格式，解码不受影响
    pub row_format: RowFormat,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
    /// 同时输出到标准错误
    pub to_stderr: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            row_format: RowFormat::V2,
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "tidb-codec".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
            to_stderr: false,
        }
    }
}

impl CodecConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let mut config: CodecConfig = toml::from_str(&content)?;
        config.log.dir = CodecConfig::resolve_log_dir(&config.log.dir)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 相对路径保持不变，`~` 开头的路径展开到用户主目录
    fn resolve_log_dir(log_dir: &str) -> Result<String, Box<dyn std::error::Error>> {
        let Some(relative_path) = log_dir.strip_prefix('~') else {
            return Ok(log_dir.to_string());
        };
        let home_dir = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or("无法获取用户主目录")?;
        let relative_path = relative_path.trim_start_matches(['/', '\\']);
        Ok(home_dir.join(relative_path).to_string_lossy().into_owned())
    }
}
