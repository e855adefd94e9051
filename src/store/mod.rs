pub mod mem;

use std::collections::BTreeMap;

use crate::core::{Letter, NewName};
use crate::error::StoreError;

pub use mem::MemStore;

/// 持久存储契约：排序切片扫描 + 按首字母聚合 + 批量原子写入。
///
/// ## 契约（重要）
/// - `scan` 的顺序必须是全局排序（按 name，重名按插入 id 稳定打破平局），
///   同一数据集上重复调用结果逐字节一致。
/// - `insert_batch` 必须整批可见或整批不可见，并发读者不得观察到半批。
/// - `letter_first_offsets` 返回 0-based 全局 offset；其正确性依赖
///   “插入顺序 == 排序顺序”这一导入不变量（见 ingest 模块）。
pub trait RecordStore: Send + Sync {
    /// 原子批量插入；id 由存储层按插入顺序分配。
    fn insert_batch(&self, rows: &[NewName]) -> Result<(), StoreError>;

    /// 当前记录总数。
    fn count(&self) -> Result<u64, StoreError>;

    /// 全局排序切片：从 offset 起最多 limit 条名字。
    /// offset 超出末尾返回空切片，不是错误。
    fn scan(&self, offset: u64, limit: usize) -> Result<Vec<String>, StoreError>;

    /// 按首字母分组计数（无首字母分区键的行不计入任何组）。
    fn letter_counts(&self) -> Result<BTreeMap<Letter, u64>, StoreError>;

    /// 按首字母分组的最小全局 offset（0-based）。
    fn letter_first_offsets(&self) -> Result<BTreeMap<Letter, u64>, StoreError>;
}
