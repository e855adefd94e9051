use thiserror::Error;

/// 存储层错误：对上层只区分“暂时不可用”与“内部不一致”。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store corrupted: {0}")]
    Corrupted(String),
}

/// 查询边界错误分类（对应 HTTP 状态码）。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 参数非法：4xx，绝不自动重试
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// 索引尚未完成首次构建：503，客户端应稍后重试
    #[error("index not ready")]
    NotReady,
    /// 存储层瞬时故障：5xx，不在服务端重试
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 导入管道错误：任何一个批次失败都会中止整轮导入。
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("batch {batch} failed after {committed} rows committed: {source}")]
    Batch {
        /// 失败批次的 1-based 序号
        batch: u64,
        /// 此前已成功提交的行数（保持不变，不跨批回滚）
        committed: u64,
        source: StoreError,
    },
}
