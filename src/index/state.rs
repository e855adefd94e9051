use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;

use crate::error::StoreError;
use crate::index::alphabet::{LetterIndex, LetterIndexBuilder};
use crate::store::RecordStore;

/// 启动期索引构建的重试策略：有界次数 + 指数退避 + 抖动。
/// 不做无限重试——超过上限就报错退出，交给进程监督者。
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// 第 attempt 次失败后的等待时间（attempt 从 1 开始）。
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16));
        let capped = exp.min(self.max_delay);
        // 抖动：0–50%，避免多实例同拍重试。不引入 rand，取时钟纳秒位即可。
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as u64)
            .unwrap_or(0);
        capped + Duration::from_millis(nanos % (capped.as_millis().max(2) as u64 / 2))
    }
}

/// 进程级索引状态：一个原子可换的不可变快照。
///
/// 就绪 == 快照存在；读者要么看到完整旧快照、要么看到完整新快照，
/// 不存在撕裂的中间态。index map / total / initialized 三个状态
/// 全部折叠进这一个指针，不再各自可变。
pub struct IndexState {
    snapshot: ArcSwapOption<LetterIndex>,
}

impl IndexState {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwapOption::from(None),
        }
    }

    /// 原子发布新快照（整体替换，绝不增量修补）。
    pub fn publish(&self, index: LetterIndex) {
        self.snapshot.store(Some(Arc::new(index)));
    }

    pub fn current(&self) -> Option<Arc<LetterIndex>> {
        self.snapshot.load_full()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.load().is_some()
    }

    /// 重建并发布。构建失败时旧快照原样保留。
    pub fn rebuild_from(&self, store: &dyn RecordStore) -> Result<(), StoreError> {
        let index = LetterIndexBuilder::build(store)?;
        self.publish(index);
        Ok(())
    }

    /// 监督式初始化：有界重试直到首次构建成功。
    pub async fn init_with_retry(
        &self,
        store: Arc<dyn RecordStore>,
        policy: RetryPolicy,
    ) -> anyhow::Result<()> {
        for attempt in 1..=policy.max_attempts {
            match self.rebuild_from(store.as_ref()) {
                Ok(()) => return Ok(()),
                Err(e) if attempt == policy.max_attempts => {
                    return Err(anyhow::anyhow!(
                        "index build failed after {} attempts: {}",
                        attempt,
                        e
                    ));
                }
                Err(e) => {
                    let wait = policy.backoff(attempt);
                    tracing::warn!(
                        "index build attempt {}/{} failed: {}, retrying in {:?}",
                        attempt,
                        policy.max_attempts,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
        unreachable!("max_attempts >= 1")
    }
}

impl Default for IndexState {
    fn default() -> Self {
        Self::new()
    }
}
