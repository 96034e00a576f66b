//! 列布局模型：schema / 偏移计算（纯函数，无 I/O）
//!
//! 对于列为 `c0..ck`、行数为 `n` 的组，列 `ci` 占据
//! `[group.offset + i*n*4, group.offset + (i+1)*n*4)`。

use crate::common::{HtyError, Result, CELL_BYTES};
use crate::meta::{Group, Metadata};

/// 按 组→列 顺序找到首个同名列，返回 (所在组, 组内下标)
pub fn locate<'a>(meta: &'a Metadata, column: &str) -> Result<(&'a Group, usize)> {
    meta.groups.iter()
        .find_map(|g| g.position(column).map(|i| (g, i)))
        .ok_or_else(|| HtyError::ColumnNotFound(column.into()))
}

/// 一列数据占用的字节数；`num_rows` 来自文件尾部，溢出时返回 `None`
pub fn column_span(num_rows: u64) -> Option<u64> {
    num_rows.checked_mul(CELL_BYTES)
}

/// 组内第 `index` 列的绝对字节偏移（64 位运算），溢出时返回 `None`
pub fn byte_offset(group: &Group, index: usize, num_rows: u64) -> Option<u64> {
    (index as u64)
        .checked_mul(column_span(num_rows)?)?
        .checked_add(group.offset)
}

/// 整个组占用的字节数
pub fn group_span(group: &Group, num_rows: u64) -> Option<u64> {
    (group.columns.len() as u64).checked_mul(column_span(num_rows)?)
}

/// 首个列集合包含全部 `names` 的组；跨组查询一律失败
pub fn group_containing_all<'a, S: AsRef<str>>(meta: &'a Metadata, names: &[S]) -> Result<&'a Group> {
    meta.groups.iter()
        .find(|g| names.iter().all(|n| g.contains(n.as_ref())))
        .ok_or_else(|| HtyError::ColumnsSpanGroups(
            names.iter().map(|n| n.as_ref().to_string()).collect(),
        ))
}

/// 组内第 `index` 列能否按固定宽度读回
///
/// string 列每个值占 (字节数 + 1) 个 Cell，它本身以及组内排在它之后的列
/// 都不满足布局不变式。
pub fn ensure_readable(group: &Group, index: usize) -> Result<()> {
    match group.columns[..=index].iter().find(|c| !c.column_type.is_fixed_width()) {
        Some(c) => Err(HtyError::UnsupportedType {
            column:      group.columns[index].name.clone(),
            column_type: c.column_type,
        }),
        None => Ok(()),
    }
}
