use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::core::{Letter, NameRow, NewName};
use crate::error::StoreError;
use crate::store::RecordStore;

struct Inner {
    /// 插入顺序存放；id = 下标 + 1
    rows: Vec<NameRow>,
    /// 按 (name, id) 排序的行号视图；插入后失效，扫描前惰性重建。
    /// 等价于数据库的 name 二级索引，避免每次 scan 全量排序。
    sorted: Option<Vec<u32>>,
}

/// 内存实现：单写多读，批次原子性由写锁保证。
///
/// 行号视图用 u32（4000 万行 160MB vs usize 320MB）；超过 u32::MAX 行
/// 直接拒绝写入而不是截断。
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: Vec::new(),
                sorted: None,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().rows.is_empty()
    }

    fn rebuild_sorted(inner: &mut Inner) {
        let mut view: Vec<u32> = (0..inner.rows.len() as u32).collect();
        // 稳定排序：重名按原下标（即 id）打破平局，保证扫描可复现。
        view.sort_by(|&a, &b| inner.rows[a as usize].name.cmp(&inner.rows[b as usize].name));
        inner.sorted = Some(view);
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemStore {
    fn insert_batch(&self, rows: &[NewName]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut inner = self.inner.write();
        let total = inner.rows.len() as u64 + rows.len() as u64;
        if total > u32::MAX as u64 {
            return Err(StoreError::Corrupted(format!(
                "row count {} exceeds store capacity",
                total
            )));
        }

        // 写锁内整批追加：读者要么看到追加前、要么看到追加后。
        let mut next_id = inner.rows.len() as u64 + 1;
        for r in rows {
            inner.rows.push(NameRow {
                id: next_id,
                name: r.name.clone(),
                first: r.first,
            });
            next_id += 1;
        }
        inner.sorted = None;
        Ok(())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().rows.len() as u64)
    }

    fn scan(&self, offset: u64, limit: usize) -> Result<Vec<String>, StoreError> {
        // 快路径：已有排序视图则只读
        {
            let inner = self.inner.read();
            if let Some(view) = &inner.sorted {
                return Ok(slice_names(&inner.rows, view, offset, limit));
            }
        }

        let mut inner = self.inner.write();
        if inner.sorted.is_none() {
            Self::rebuild_sorted(&mut inner);
        }
        let view = inner.sorted.as_ref().expect("just rebuilt");
        Ok(slice_names(&inner.rows, view, offset, limit))
    }

    fn letter_counts(&self) -> Result<BTreeMap<Letter, u64>, StoreError> {
        let inner = self.inner.read();
        let mut counts = BTreeMap::new();
        for row in &inner.rows {
            if let Some(l) = row.first {
                *counts.entry(l).or_insert(0u64) += 1;
            }
        }
        Ok(counts)
    }

    fn letter_first_offsets(&self) -> Result<BTreeMap<Letter, u64>, StoreError> {
        let inner = self.inner.read();
        let mut firsts = BTreeMap::new();
        for row in &inner.rows {
            if let Some(l) = row.first {
                // id 从 1 开始；导入不变量下 id-1 即全局 offset
                firsts.entry(l).or_insert(row.id - 1);
            }
        }
        Ok(firsts)
    }
}

fn slice_names(rows: &[NameRow], view: &[u32], offset: u64, limit: usize) -> Vec<String> {
    if offset >= view.len() as u64 {
        return Vec::new();
    }
    view[offset as usize..]
        .iter()
        .take(limit)
        .map(|&i| rows[i as usize].name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<NewName> {
        names
            .iter()
            .map(|n| NewName::from_line(n).unwrap())
            .collect()
    }

    #[test]
    fn scan_is_sorted_and_reproducible() {
        let store = MemStore::new();
        store
            .insert_batch(&named(&["Cid", "Amy", "Bob"]))
            .unwrap();

        let first = store.scan(0, 10).unwrap();
        assert_eq!(first, vec!["Amy", "Bob", "Cid"]);
        assert_eq!(store.scan(0, 10).unwrap(), first);
        assert_eq!(store.scan(1, 1).unwrap(), vec!["Bob"]);
    }

    #[test]
    fn duplicate_names_keep_insertion_order() {
        let store = MemStore::new();
        store.insert_batch(&named(&["Amy", "Amy", "Amy"])).unwrap();
        // 三条重名记录：每次扫描切片结果一致（稳定平局）
        for off in 0..3 {
            assert_eq!(store.scan(off, 1).unwrap(), vec!["Amy"]);
        }
        assert_eq!(store.scan(0, 3).unwrap().len(), 3);
    }

    #[test]
    fn scan_past_end_is_empty_not_error() {
        let store = MemStore::new();
        store.insert_batch(&named(&["Amy"])).unwrap();
        assert!(store.scan(5, 10).unwrap().is_empty());
        assert!(store.scan(1, 10).unwrap().is_empty());
    }

    #[test]
    fn letter_aggregates_skip_non_alphabet_rows() {
        let store = MemStore::new();
        store
            .insert_batch(&named(&["1st Place", "Amy", "Anna", "Bob"]))
            .unwrap();

        let counts = store.letter_counts().unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&Letter::of_name("A").unwrap()], 2);
        assert_eq!(counts[&Letter::of_name("B").unwrap()], 1);

        // "1st Place" 占 offset 0，但不产生任何字母分组
        let firsts = store.letter_first_offsets().unwrap();
        assert_eq!(firsts[&Letter::of_name("A").unwrap()], 1);
        assert_eq!(firsts[&Letter::of_name("B").unwrap()], 3);
    }

    #[test]
    fn insert_batch_is_atomic_for_readers() {
        use std::sync::Arc;

        let store = Arc::new(MemStore::new());
        let batch = named(&["Amy", "Bob", "Cid"]);

        let s2 = store.clone();
        let reader = std::thread::spawn(move || {
            // 批次原子性：任一瞬间 count 只能是 0 或 3
            for _ in 0..1000 {
                let c = s2.count().unwrap();
                assert!(c == 0 || c == 3, "observed partial batch: {}", c);
            }
        });

        store.insert_batch(&batch).unwrap();
        reader.join().unwrap();
        assert_eq!(store.count().unwrap(), 3);
    }
}
