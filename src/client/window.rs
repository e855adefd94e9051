use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::client::fetcher::RangeFetcher;
use crate::core::Letter;
use crate::index::IndexState;

/// 滚动静默期：该时间内没有更新的范围请求才真正发起取数。
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// 在途请求去重键：(字母, 局部起点, 局部终点)
type RangeKey = (Letter, u64, u64);

#[derive(Debug, Default)]
pub struct CacheStats {
    /// 实际发出的取数次数
    pub fetches_issued: AtomicU64,
    /// 被“最新者胜”合并掉的 debounce 请求数
    pub coalesced: AtomicU64,
    /// 因同键在途而被吞掉的请求数
    pub deduped: AtomicU64,
    /// 取数失败次数（失败范围不标记已加载，等待按需重试）
    pub fetch_failures: AtomicU64,
}

/// 每字母单槽的待发请求：只保留最近一个，旧的连同定时器一起废弃。
struct PendingLoad {
    start: u64,
    end: u64,
    generation: u64,
    timer: JoinHandle<()>,
}

/// 窗口缓存 + 请求协调器（消费端）。
///
/// 职责：
/// - 把 (字母, 局部 index 区间) 翻译成全局 offset 区间；
/// - debounce：滚动风暴坍缩成静默期后的一次取数（深度为 1 的合并队列）；
/// - 在途去重：同键请求绝不重发；
/// - 加性合并：取回的记录按原请求坐标并入稀疏缓存，乱序完成也正确。
///
/// 缓存键是 (字母, 局部 index) 复合元组而不是嵌套 map；无淘汰策略
/// （只有滚动到过的 index 才会被填充）。
pub struct WindowCache {
    index: Arc<IndexState>,
    fetcher: Arc<dyn RangeFetcher>,
    slots: DashMap<(Letter, u64), String>,
    inflight: Mutex<HashSet<RangeKey>>,
    pending: Mutex<HashMap<Letter, PendingLoad>>,
    debounce_gen: AtomicU64,
    debounce: Duration,
    pub stats: CacheStats,
    /// 每次合并完成后通知一次；消费者等它而不是轮询网络
    pub loaded_notify: Notify,
}

impl WindowCache {
    pub fn new(index: Arc<IndexState>, fetcher: Arc<dyn RangeFetcher>) -> Self {
        Self::with_debounce(index, fetcher, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(
        index: Arc<IndexState>,
        fetcher: Arc<dyn RangeFetcher>,
        debounce: Duration,
    ) -> Self {
        Self {
            index,
            fetcher,
            slots: DashMap::new(),
            inflight: Mutex::new(HashSet::new()),
            pending: Mutex::new(HashMap::new()),
            debounce_gen: AtomicU64::new(0),
            debounce,
            stats: CacheStats::default(),
            loaded_notify: Notify::new(),
        }
    }

    /// 滚动驱动入口：debounce 后发起 [local_start, local_end] 的加载。
    /// 同一字母上更早的待发请求被本次替换（不排队）。
    pub fn ensure_loaded(self: &Arc<Self>, letter: Letter, local_start: u64, local_end: u64) {
        let Some(snapshot) = self.index.current() else {
            tracing::debug!("ensure_loaded before index ready, dropping");
            return;
        };
        if !snapshot.contains(letter) {
            tracing::debug!("letter {} absent from index, refusing request", letter);
            return;
        }

        let generation = self.debounce_gen.fetch_add(1, Ordering::Relaxed) + 1;
        let cache = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(cache.debounce).await;
            cache.fire(letter, generation);
        });

        let mut pending = self.pending.lock();
        if let Some(prev) = pending.insert(
            letter,
            PendingLoad {
                start: local_start,
                end: local_end,
                generation,
                timer,
            },
        ) {
            prev.timer.abort();
            self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 直接用户动作（跳字母）：绕过 debounce 立即取数。
    pub fn prefetch(self: &Arc<Self>, letter: Letter, local_start: u64, local_end: u64) {
        self.issue(letter, local_start, local_end);
    }

    pub fn is_loaded(&self, letter: Letter, local_index: u64) -> bool {
        self.slots.contains_key(&(letter, local_index))
    }

    pub fn read(&self, letter: Letter, local_index: u64) -> Option<String> {
        self.slots.get(&(letter, local_index)).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 静默期到点：槽里仍是自己这代才发射（被更新请求替换过则放弃）。
    fn fire(self: &Arc<Self>, letter: Letter, generation: u64) {
        let load = {
            let mut pending = self.pending.lock();
            let current = pending
                .get(&letter)
                .map_or(false, |p| p.generation == generation);
            if current {
                pending.remove(&letter)
            } else {
                None
            }
        };
        if let Some(load) = load {
            self.issue(letter, load.start, load.end);
        }
    }

    /// 翻译 + 去重 + 异步取数。
    fn issue(self: &Arc<Self>, letter: Letter, local_start: u64, local_end: u64) {
        let Some(snapshot) = self.index.current() else {
            return;
        };
        let Some(span) = snapshot.span(letter) else {
            tracing::debug!("letter {} absent from index, refusing fetch", letter);
            return;
        };
        if local_start >= span.count || local_end < local_start {
            return;
        }
        // 截到字母自己的区段内，避免越过字母边界拉到下一个字母的记录
        let local_end = local_end.min(span.count - 1);

        let key: RangeKey = (letter, local_start, local_end);
        {
            let mut inflight = self.inflight.lock();
            if !inflight.insert(key) {
                self.stats.deduped.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        self.stats.fetches_issued.fetch_add(1, Ordering::Relaxed);

        let global_start = span.start_offset + local_start;
        let limit = local_end - local_start + 1;
        tracing::debug!(
            "fetching {} [{}..={}] (global {} limit {})",
            letter,
            local_start,
            local_end,
            global_start,
            limit
        );

        // 同步拿到 future：请求在这一刻算“已发出”，spawn 只负责等待完成
        let fut = self.fetcher.fetch(global_start, limit);
        let cache = self.clone();
        tokio::spawn(async move {
            let result = fut.await;
            // 在途标记无条件移除：成功、失败都不留残影
            cache.inflight.lock().remove(&key);

            match result {
                Ok(rows) => {
                    // 加性合并：只增不删，重叠/乱序完成的请求互不破坏
                    for (i, name) in rows.into_iter().enumerate() {
                        cache.slots.insert((letter, local_start + i as u64), name);
                    }
                    cache.loaded_notify.notify_waiters();
                }
                Err(e) => {
                    cache.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("fetch {} [{}..={}] failed: {}", letter, local_start, local_end, e);
                }
            }
        });
    }
}
