pub mod generate;

use std::io::BufRead;
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::core::NewName;
use crate::error::IngestError;
use crate::store::RecordStore;

/// 单个事务批次的默认行数：摊薄每批的往返/锁开销。
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// 导入管道：换行分隔的名字源 → 定长原子批次写入存储。
///
/// ## 不变量（关键）
/// 输入必须已按全局排序顺序排好——管道自己不排序。只有这样存储层
/// 分配的自增 id 才与排序名次重合，字母索引的 offset 语义才成立；
/// 乱序输入会无声地腐蚀索引。
///
/// 失败语义：某批失败 → 该批整体丢弃、之前批次原样保留、整轮中止。
/// 不支持增量续传，重跑需要先清空存储。
pub struct Ingestor {
    store: Arc<dyn RecordStore>,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(store: Arc<dyn RecordStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// 返回成功导入的总行数。空白行跳过、不计数。
    pub fn ingest(&self, reader: impl BufRead) -> Result<u64, IngestError> {
        let mut batch: Vec<NewName> = Vec::with_capacity(self.batch_size);
        let mut imported = 0u64;
        let mut batch_no = 0u64;

        for line in reader.lines() {
            let line = line?;
            // NFC：同一名字不同 Unicode 编码归一，保证排序/比较一致
            let normalized: String = line.nfc().collect();
            let Some(row) = NewName::from_line(&normalized) else {
                continue;
            };
            batch.push(row);

            if batch.len() >= self.batch_size {
                batch_no += 1;
                self.commit(&batch, batch_no, imported)?;
                imported += batch.len() as u64;
                if batch_no % 100 == 0 {
                    tracing::info!("imported {} names...", imported);
                }
                batch.clear();
            }
        }

        if !batch.is_empty() {
            batch_no += 1;
            self.commit(&batch, batch_no, imported)?;
            imported += batch.len() as u64;
        }

        tracing::info!("import complete: {} names in {} batches", imported, batch_no);
        Ok(imported)
    }

    fn commit(&self, batch: &[NewName], batch_no: u64, committed: u64) -> Result<(), IngestError> {
        self.store
            .insert_batch(batch)
            .map_err(|source| IngestError::Batch {
                batch: batch_no,
                committed,
                source,
            })
    }
}
