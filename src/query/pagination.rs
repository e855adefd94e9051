use serde::Serialize;

use crate::error::ApiError;
use crate::index::IndexState;
use crate::store::RecordStore;

/// 单次分页请求的 limit 硬上限：拒绝而不是静默截断。
pub const LIMIT_CAP: u64 = 200_000;

/// 一页结果：严格全局排序切片 + 数据集总量（取自快照缓存值）。
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub users: Vec<String>,
    pub total: u64,
    pub start: u64,
    pub limit: u64,
}

/// 无状态分页：给定全局 offset 与 limit 返回排序切片。
///
/// - limit 为 0 或超过上限 → INVALID_ARGUMENT（绝不 clamp）
/// - 索引未就绪 → NOT_READY（total 的缓存来源是快照）
/// - offset 越过末尾 → 合法空页
pub fn fetch_range(
    store: &dyn RecordStore,
    index: &IndexState,
    start: u64,
    limit: u64,
) -> Result<Page, ApiError> {
    if limit == 0 || limit > LIMIT_CAP {
        return Err(ApiError::InvalidArgument(format!(
            "limit must be in 1..={}, got {}",
            LIMIT_CAP, limit
        )));
    }

    let snapshot = index.current().ok_or(ApiError::NotReady)?;

    tracing::debug!("fetching users range [{}, {})", start, start + limit);
    let users = store.scan(start, limit as usize)?;

    Ok(Page {
        users,
        total: snapshot.total(),
        start,
        limit,
    })
}
