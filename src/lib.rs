//! # hty-storage-engine
//!
//! HTY 自描述列存文件格式的 Rust 实现：
//! - **trailer**：尾部元数据文档的定位与编解码
//! - **layout** ：组内列偏移计算（所有读写共享）
//! - **query**  ：单列/多列投影、谓词过滤及组合，只读取查询涉及的字节
//! - **mutation**：copy-rewrite 追加行，生成新的不可变文件版本
//! - **ingest** ：由表格文本生成第一代 HTY 文件
//!
//! ## 整体架构
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       HtyTable                           │
//! │          (path + 打开时解码的 Metadata)                   │
//! │   ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │
//! │   │    query     │  │   mutation   │  │    ingest    │  │
//! │   │ project      │  │ add_row      │  │ TableWriter  │  │
//! │   │ filter       │  │ copy-rewrite │  │ convert_csv  │  │
//! │   └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  │
//! │          │                 │                 │           │
//! │        layout ←────────────┤          ColumnWriter × N   │
//! │   locate / byte_offset     │                 │           │
//! │   group_containing_all     │                 │           │
//! │          │                 │                 │           │
//! │   ┌──────┴─────────────────┴─────────────────┴───────┐  │
//! │   │  trailer: [data][metadata JSON][len u32 LE]       │  │
//! │   └──────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! 日志通过 `tracing` 输出（每个操作一个 span，事件带 `op` / `phase` 字段），
//! 未安装 subscriber 时引擎没有任何副作用。

// ── 格式层 ────────────────────────────────────────────────────────────────────
pub mod common;
pub mod field_type;
pub mod meta;
pub mod trailer;
pub mod layout;

// ── 读写路径 ──────────────────────────────────────────────────────────────────
pub mod predicate;
pub mod query;
pub mod column_writer;
pub mod mutation;
pub mod ingest;
pub mod options;
pub mod storage;

pub use common::{HtyError, Result};
pub use field_type::{Cell, ColumnType};
pub use meta::{ColumnMeta, Group, Metadata};
pub use predicate::CompareOp;
pub use query::{FilteredProjection, ResultSet};
pub use storage::HtyTable;
