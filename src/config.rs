use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::index::RetryPolicy;

/// 运行配置（TOML，全部字段可缺省）。
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP 监听端口
    pub port: u16,
    /// 名字源文件（换行分隔、已排序）
    pub names_file: PathBuf,
    /// 源文件不存在时生成多少条测试数据
    pub generate_count: usize,
    /// 导入批次大小
    pub batch_size: usize,
    /// 客户端滚动 debounce（毫秒）
    pub debounce_ms: u64,
    /// 索引构建重试
    pub index_retry: RetryConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5001,
            names_file: PathBuf::from("usersnames.txt"),
            generate_count: 1_000_000,
            batch_size: 10_000,
            debounce_ms: 150,
            index_retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl Config {
    /// 读取配置文件；不存在则用默认值（存在但非法仍然报错）。
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&raw)?;
        Ok(cfg)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.index_retry.max_attempts.max(1),
            base_delay: Duration::from_millis(self.index_retry.base_delay_ms),
            max_delay: Duration::from_millis(self.index_retry.max_delay_ms),
        }
    }
}
