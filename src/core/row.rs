use serde::{Deserialize, Serialize};

use crate::core::letter::Letter;

/// 存储层的一行：导入时分配的自增 id + 名字 + 首字母分区键。
///
/// 约束（由导入管道保证）：导入顺序 == 全局排序顺序，因此
/// `id - 1` 恰好是该记录的全局 0-based offset。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameRow {
    pub id: u64,
    pub name: String,
    pub first: Option<Letter>,
}

/// 待插入的记录（id 由存储层分配）。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewName {
    pub name: String,
    pub first: Option<Letter>,
}

impl NewName {
    pub fn from_line(line: &str) -> Option<Self> {
        let name = line.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            first: Letter::of_name(name),
        })
    }
}
