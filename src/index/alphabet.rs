use std::collections::BTreeMap;

use crate::core::{Letter, LetterSpan};
use crate::error::StoreError;
use crate::store::RecordStore;

/// 字母索引快照：字母 → {全局起始 offset, 记录数}。
///
/// 不可变：整体重建、整体发布（见 state.rs），绝不原地修补。
/// 只收录数据中实际存在的字母——缺失字母整体不在 map 里，而不是 count=0。
#[derive(Clone, Debug, Default)]
pub struct LetterIndex {
    spans: BTreeMap<Letter, LetterSpan>,
    total: u64,
}

impl LetterIndex {
    pub fn span(&self, letter: Letter) -> Option<LetterSpan> {
        self.spans.get(&letter).copied()
    }

    pub fn contains(&self, letter: Letter) -> bool {
        self.spans.contains_key(&letter)
    }

    /// 数据集总行数（含无字母分区键的行），作为分页 total 的缓存值。
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn letters(&self) -> impl Iterator<Item = (Letter, LetterSpan)> + '_ {
        self.spans.iter().map(|(l, s)| (*l, *s))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// 快照构建器：两次聚合查询 + 交集合并。
///
/// 失败语义：任一聚合失败则本次构建整体失败，半成品不会外泄；
/// 重试策略由调用方（state.rs 的 supervising loop）负责。
pub struct LetterIndexBuilder;

impl LetterIndexBuilder {
    pub fn build(store: &dyn RecordStore) -> Result<LetterIndex, StoreError> {
        let counts = store.letter_counts()?;
        let firsts = store.letter_first_offsets()?;
        let total = store.count()?;

        let mut spans = BTreeMap::new();
        for (letter, count) in counts {
            if count == 0 {
                continue;
            }
            // 两次聚合必须同时命中该字母；count 来自真实分组计数，
            // 不靠相邻字母 offset 相减推导。
            let Some(&start_offset) = firsts.get(&letter) else {
                tracing::warn!(
                    "letter {} has count {} but no first offset, skipping",
                    letter,
                    count
                );
                continue;
            };
            spans.insert(
                letter,
                LetterSpan {
                    start_offset,
                    count,
                },
            );
        }

        let index = LetterIndex { spans, total };
        debug_assert!(spans_disjoint(&index));
        tracing::info!(
            "letter index built: {} letters, {} rows total",
            index.len(),
            index.total()
        );
        Ok(index)
    }
}

/// 不变量：任意两个相邻字母 start(L) + count(L) <= start(L')。
fn spans_disjoint(index: &LetterIndex) -> bool {
    let mut prev_end = 0u64;
    for (_, span) in index.letters() {
        if span.start_offset < prev_end {
            return false;
        }
        prev_end = span.start_offset + span.count;
    }
    true
}
