use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::window::WindowCache;
use crate::core::Letter;
use crate::index::IndexState;

/// 跳转字母后第一批预取的行数。
pub const DEFAULT_PREFETCH_BATCH: u64 = 1000;

/// 当前字母的可见区间信息。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterRange {
    pub letter: Letter,
    pub count: u64,
}

/// 导航控制器：持有“当前字母 + 滚动位置”，驱动窗口缓存。
///
/// 跳字母是直接用户动作而非滚动抖动，预取绕过 debounce；
/// 选中索引里不存在的字母是合法的空状态（count 0，不发请求）。
pub struct Navigator {
    index: Arc<IndexState>,
    cache: Arc<WindowCache>,
    current: Mutex<Option<Letter>>,
    position: AtomicU64,
    prefetch_batch: u64,
}

impl Navigator {
    pub fn new(index: Arc<IndexState>, cache: Arc<WindowCache>) -> Self {
        Self {
            index,
            cache,
            current: Mutex::new(None),
            position: AtomicU64::new(0),
            prefetch_batch: DEFAULT_PREFETCH_BATCH,
        }
    }

    pub fn with_prefetch_batch(mut self, batch: u64) -> Self {
        self.prefetch_batch = batch.max(1);
        self
    }

    /// 切换当前字母：位置归零；字母有数据则立即预取第一批。
    pub fn select_letter(&self, letter: Letter) {
        *self.current.lock() = Some(letter);
        self.position.store(0, Ordering::Relaxed);

        let has_data = self
            .index
            .current()
            .map(|snap| snap.contains(letter))
            .unwrap_or(false);
        if has_data {
            self.cache.prefetch(letter, 0, self.prefetch_batch - 1);
        } else {
            tracing::debug!("selected empty letter {}, rendering empty state", letter);
        }
    }

    /// 当前字母及其记录数；未选择时 None，空字母 count = 0。
    pub fn current_range(&self) -> Option<LetterRange> {
        let letter = (*self.current.lock())?;
        let count = self
            .index
            .current()
            .and_then(|snap| snap.span(letter))
            .map(|span| span.count)
            .unwrap_or(0);
        Some(LetterRange { letter, count })
    }

    /// 滚动回调汇报的可见位置（仅用于展示/调试）。
    pub fn set_position(&self, local_index: u64) {
        self.position.store(local_index, Ordering::Relaxed);
    }

    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    /// 滚动可见区间变化：交给窗口缓存 debounce 处理。
    pub fn visible_range_changed(&self, local_start: u64, local_end: u64) {
        let Some(letter) = *self.current.lock() else {
            return;
        };
        self.cache.ensure_loaded(letter, local_start, local_end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::client::fetcher::{FetchFuture, RangeFetcher};
    use crate::core::NewName;
    use crate::error::ApiError;
    use crate::store::{MemStore, RecordStore};

    fn letter(c: char) -> Letter {
        Letter::from_ascii_upper(c as u8).unwrap()
    }

    struct CountingFetcher {
        store: Arc<MemStore>,
        calls: AtomicU64,
    }

    impl RangeFetcher for CountingFetcher {
        fn fetch(&self, start: u64, limit: u64) -> FetchFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let store = self.store.clone();
            Box::pin(async move {
                store.scan(start, limit as usize).map_err(ApiError::from)
            })
        }
    }

    fn fixture(names: &[&str]) -> (Arc<CountingFetcher>, Arc<WindowCache>, Navigator) {
        let store = Arc::new(MemStore::new());
        let rows: Vec<NewName> = names
            .iter()
            .map(|n| NewName::from_line(n).unwrap())
            .collect();
        store.insert_batch(&rows).unwrap();

        let index = Arc::new(IndexState::new());
        index.rebuild_from(store.as_ref()).unwrap();

        let fetcher = Arc::new(CountingFetcher {
            store,
            calls: AtomicU64::new(0),
        });
        let cache = Arc::new(WindowCache::new(index.clone(), fetcher.clone()));
        let nav = Navigator::new(index, cache.clone()).with_prefetch_batch(10);
        (fetcher, cache, nav)
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_absent_letter_is_a_fetchless_empty_state() {
        let (fetcher, cache, nav) = fixture(&["Amy", "Bob"]);

        nav.select_letter(letter('Z'));

        assert_eq!(
            nav.current_range(),
            Some(LetterRange {
                letter: letter('Z'),
                count: 0
            })
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_letter_prefetches_first_batch_without_debounce() {
        let (fetcher, cache, nav) = fixture(&["Ada", "Amy", "Ann", "Bob"]);

        nav.set_position(42);
        nav.select_letter(letter('A'));

        // 预取绕过 debounce：立即计入一次请求，位置归零
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(nav.position(), 0);

        // 等待合并完成，A 的 3 条全部就位（批大小 10 被截到区段内）
        for _ in 0..100 {
            if cache.is_loaded(letter('A'), 2) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(cache.read(letter('A'), 0).as_deref(), Some("Ada"));
        assert_eq!(cache.read(letter('A'), 2).as_deref(), Some("Ann"));
        assert!(!cache.is_loaded(letter('A'), 3));
    }

    #[tokio::test(start_paused = true)]
    async fn scroll_updates_go_through_debounce() {
        let (fetcher, cache, nav) = fixture(&["Ada", "Amy", "Ann", "Bob"]);

        nav.select_letter(letter('A'));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        nav.visible_range_changed(0, 1);
        nav.visible_range_changed(1, 2);
        // debounce 未到点前不发第二次
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats.coalesced.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn current_range_reports_letter_count() {
        let (_fetcher, _cache, nav) = fixture(&["Amy", "Ann", "Bob"]);

        assert_eq!(nav.current_range(), None);
        nav.select_letter(letter('A'));
        let range = nav.current_range().unwrap();
        assert_eq!(range.count, 2);
    }
}
