//! 列的声明类型与 4 字节 Cell
//!
//! 磁盘上每个 Cell 恒为 4 字节：
//! - `int`   — i32 原值
//! - `float` — f32 的 IEEE-754 位模式原样存入 i32 槽位（重解释，不做数值转换）
//! - `string`— 每个 UTF-8 字节一个 Cell（有符号扩展），外加一个 0 终止 Cell（只写，不可回读）

use serde::{Deserialize, Serialize};

/// 元数据中记录的列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    String,
}

impl ColumnType {
    /// 读路径是否能按 `num_rows` 个 Cell 还原本列
    pub fn is_fixed_width(self) -> bool {
        !matches!(self, Self::String)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Int    => "int",
            Self::Float  => "float",
            Self::String => "string",
        };
        f.write_str(s)
    }
}

/// 一个 Cell 的运行时表示
///
/// 浮点值以位模式保存（`FloatBits`），只能通过 [`Cell::from_f32`] /
/// [`Cell::as_f32`] 显式重解释，避免任何隐式数值转换破坏 float 数据。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Int(i32),
    FloatBits(i32),
}

impl Cell {
    pub fn from_f32(v: f32) -> Self {
        Self::FloatBits(v.to_bits() as i32)
    }

    /// 按列声明类型给磁盘上读到的原始 i32 打标签
    pub fn from_raw(raw: i32, column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Float => Self::FloatBits(raw),
            _                 => Self::Int(raw),
        }
    }

    /// 写入磁盘的 4 字节原值
    pub fn raw(self) -> i32 {
        match self {
            Self::Int(v) | Self::FloatBits(v) => v,
        }
    }

    /// 比较用的浮点视图：`FloatBits` 重解释位模式，`Int` 按数值转换
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Int(v)       => v as f32,
            Self::FloatBits(b) => f32::from_bits(b as u32),
        }
    }

    pub fn as_i32(self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(v),
            Self::FloatBits(_) => None,
        }
    }

    /// 本 Cell 能否写入声明类型为 `column_type` 的列
    pub fn fits(self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Self::Int(_), ColumnType::Int) | (Self::FloatBits(_), ColumnType::Float)
        )
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self { Self::Int(v) }
}

impl From<f32> for Cell {
    fn from(v: f32) -> Self { Self::from_f32(v) }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v)       => write!(f, "{v}"),
            Self::FloatBits(_) => write!(f, "{}", self.as_f32()),
        }
    }
}
