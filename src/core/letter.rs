use std::fmt;

use serde::{Deserialize, Serialize};

/// 固定字母表大小（A–Z）
pub const ALPHABET_LEN: usize = 26;

/// 分区键：名字的首字母，折叠到 A–Z。
///
/// 内部存 `b'A'..=b'Z'`；字母表之外的首字符（数字、标点、非拉丁）不产生
/// Letter——这类记录仍占用全局 offset，但不进入字母索引。
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Letter(u8);

impl Letter {
    /// 从已归一化的大写 ASCII 字母构造。
    pub fn from_ascii_upper(b: u8) -> Option<Self> {
        if b.is_ascii_uppercase() {
            Some(Letter(b))
        } else {
            None
        }
    }

    /// 名字 → 分区键：取首字符，Unicode 大写折叠后必须落在 A–Z。
    pub fn of_name(name: &str) -> Option<Self> {
        let first = name.chars().next()?;
        // to_uppercase 可能扩展成多个字符（如 ß → SS），取第一个即可。
        let up = first.to_uppercase().next()?;
        if up.is_ascii() {
            Self::from_ascii_upper(up as u8)
        } else {
            None
        }
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }

    /// 0-based 字母序号（A=0 … Z=25）
    pub fn ordinal(self) -> usize {
        (self.0 - b'A') as usize
    }

    /// A..=Z 全量迭代
    pub fn all() -> impl Iterator<Item = Letter> {
        (b'A'..=b'Z').map(Letter)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 字母索引中单个字母的区段：全局起始 offset + 记录数。
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSpan {
    /// 该字母第一条记录在全局排序中的 0-based offset
    pub start_offset: u64,
    /// 该字母的记录总数
    pub count: u64,
}
