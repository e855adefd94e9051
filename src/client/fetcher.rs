use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ApiError;
use crate::index::IndexState;
use crate::query::pagination;
use crate::store::RecordStore;

pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<String>, ApiError>> + Send>>;

/// 窗口缓存的取数接缝：按全局 offset 拉一段排序切片。
///
/// 生产实现直连进程内分页服务；测试用计数/可控完成顺序的 mock。
pub trait RangeFetcher: Send + Sync + 'static {
    fn fetch(&self, global_start: u64, limit: u64) -> FetchFuture;
}

/// 进程内实现：直接调用分页服务（无网络层）。
pub struct ServiceFetcher {
    store: Arc<dyn RecordStore>,
    index: Arc<IndexState>,
}

impl ServiceFetcher {
    pub fn new(store: Arc<dyn RecordStore>, index: Arc<IndexState>) -> Self {
        Self { store, index }
    }
}

impl RangeFetcher for ServiceFetcher {
    fn fetch(&self, global_start: u64, limit: u64) -> FetchFuture {
        let store = self.store.clone();
        let index = self.index.clone();
        Box::pin(async move {
            pagination::fetch_range(store.as_ref(), &index, global_start, limit)
                .map(|page| page.users)
        })
    }
}
