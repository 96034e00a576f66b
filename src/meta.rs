//! HTY 元数据文档
//!
//! 文件尾部的 JSON 文档是 schema 的唯一来源，从不根据数据区推断：
//!
//! ```text
//! { "num_rows": 3,
//!   "num_groups": 1,                                  // 可选
//!   "groups": [ { "offset": 0,
//!                 "num_columns": 2,                   // 可选
//!                 "columns": [ { "column_name": "id",     "column_type": "int"   },
//!                              { "column_name": "salary", "column_type": "float" } ] } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::field_type::ColumnType;

// ── 列定义 ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    #[serde(rename = "column_name")]
    pub name:        String,
    pub column_type: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }
    pub fn int(name: &str)   -> Self { Self::new(name, ColumnType::Int) }
    pub fn float(name: &str) -> Self { Self::new(name, ColumnType::Float) }
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// 物理上共址的一组列，列在组内按顺序列存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// 组数据在文件中的绝对起始偏移
    pub offset:      u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_columns: Option<usize>,
    pub columns:     Vec<ColumnMeta>,
}

impl Group {
    pub fn new(offset: u64, columns: Vec<ColumnMeta>) -> Self {
        Self { offset, num_columns: Some(columns.len()), columns }
    }

    /// 列在组内的位置
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

// ── Metadata ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// 所有组、所有列统一的行数
    pub num_rows:   u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_groups: Option<usize>,
    pub groups:     Vec<Group>,
}

impl Metadata {
    pub fn new(num_rows: u64, groups: Vec<Group>) -> Self {
        Self { num_rows, num_groups: Some(groups.len()), groups }
    }

    /// 按 组→列 顺序展平后的列定义；`add_row` 的每一行按此顺序给出 Cell
    pub fn flattened_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.groups.iter().flat_map(|g| g.columns.iter())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.flattened_columns().map(|c| c.name.clone()).collect()
    }

    pub fn num_columns(&self) -> usize {
        self.groups.iter().map(|g| g.columns.len()).sum()
    }

    /// 首个同名列的声明类型
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.flattened_columns()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }

    /// 重新同步可选的计数字段（仅当文档原本带有它们时）
    pub(crate) fn refresh_counts(&mut self) {
        if self.num_groups.is_some() {
            self.num_groups = Some(self.groups.len());
        }
        for g in &mut self.groups {
            if g.num_columns.is_some() {
                g.num_columns = Some(g.columns.len());
            }
        }
    }
}
