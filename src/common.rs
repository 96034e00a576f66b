//! 全局基础类型与错误定义

use thiserror::Error;

use crate::field_type::ColumnType;

// ── 类型别名 ──────────────────────────────────────────────────────────────────

/// 行号（0 起始，升序）
pub type RowId = usize;

/// 每个 Cell 在磁盘上的固定宽度（字节）
pub const CELL_BYTES: u64 = 4;

// ── 错误 ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HtyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt trailer: {0}")]
    CorruptTrailer(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("columns are not co-located in a single group: {0:?}")]
    ColumnsSpanGroups(Vec<String>),
    #[error("truncated read on column {column}: expected {expected} bytes, {available} available")]
    TruncatedRead {
        column:    String,
        expected:  u64,
        available: u64,
    },
    #[error("invalid operator code: {0}")]
    InvalidOperator(i32),
    #[error("type mismatch in column {column}: {value:?} is not {expected}")]
    TypeMismatch {
        column:   String,
        value:    String,
        expected: ColumnType,
    },
    #[error("column {column} of type {column_type} cannot be read back")]
    UnsupportedType {
        column:      String,
        column_type: ColumnType,
    },
    #[error("schema mismatch: expected {expected} cells per row, found {found}")]
    SchemaMismatch {
        expected: usize,
        found:    usize,
    },
}

pub type Result<T> = std::result::Result<T, HtyError>;
