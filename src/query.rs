//! 查询引擎：单列投影、多列投影、谓词过滤及其组合
//!
//! 所有读都只触及查询需要的列字节：先由 [`layout`] 算出列的字节区间，
//! 再 seek + 读取恰好 `num_rows` 个 Cell。跨组的多列查询一律失败
//! （[`HtyError::ColumnsSpanGroups`]），格式没有跨组拼接路径。

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, instrument, warn};

use crate::common::{HtyError, Result, RowId};
use crate::field_type::Cell;
use crate::layout;
use crate::meta::{Group, Metadata};
use crate::predicate::CompareOp;
use crate::trailer;

/// 渲染时每列的固定宽度
const DISPLAY_WIDTH: usize = 10;

// ── 结果集 ────────────────────────────────────────────────────────────────────

/// 列存结果表：`columns[i]` 对应 `names[i]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    pub names:   Vec<String>,
    pub columns: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn num_columns(&self) -> usize { self.columns.len() }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool { self.num_rows() == 0 }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.names.iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// 第 `row` 行的所有 Cell（按列顺序）
    pub fn row(&self, row: usize) -> Option<Vec<Cell>> {
        self.columns.iter().map(|c| c.get(row).copied()).collect()
    }
}

impl std::fmt::Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "No results to display.");
        }
        for name in &self.names {
            write!(f, "{:<w$}", name, w = DISPLAY_WIDTH)?;
        }
        writeln!(f)?;
        for row in 0..self.num_rows() {
            for col in &self.columns {
                let cell = col.get(row).map(ToString::to_string).unwrap_or_default();
                write!(f, "{:<w$}", cell, w = DISPLAY_WIDTH)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `project_and_filter` 的结果：越界而被跳过的过滤行号单独计数
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredProjection {
    pub result:          ResultSet,
    pub skipped_indices: usize,
}

// ── 底层读取 ──────────────────────────────────────────────────────────────────

/// 打开文件并返回数据区长度，列读取不得越过数据区进入尾部
fn open_data(path: &Path) -> Result<(BufReader<File>, u64)> {
    let mut file = File::open(path)?;
    let data_len = trailer::locate(&mut file)?.data_len();
    Ok((BufReader::new(file), data_len))
}

fn read_column(
    file:     &mut BufReader<File>,
    data_len: u64,
    group:    &Group,
    index:    usize,
    num_rows: u64,
) -> Result<Vec<Cell>> {
    layout::ensure_readable(group, index)?;
    let column = &group.columns[index];
    let span   = layout::column_span(num_rows);
    let offset = layout::byte_offset(group, index, num_rows);

    // 行数或偏移与数据区不符（含 64 位溢出）时不分配任何缓冲
    let bounds = offset.zip(span)
        .filter(|&(o, s)| o.checked_add(s).is_some_and(|end| end <= data_len));
    let Some((offset, span)) = bounds else {
        return Err(HtyError::TruncatedRead {
            column:    column.name.clone(),
            expected:  span.unwrap_or(u64::MAX),
            available: offset.map_or(0, |o| data_len.saturating_sub(o)),
        });
    };
    debug!(op = "read_column", phase = "read", column = %column.name, offset, span);

    file.seek(SeekFrom::Start(offset))?;
    let mut raw = vec![0i32; num_rows as usize];
    file.read_i32_into::<LittleEndian>(&mut raw)?;
    Ok(raw.into_iter().map(|v| Cell::from_raw(v, column.column_type)).collect())
}

/// 在指定组内读取若干列
fn read_group_columns<S: AsRef<str>>(
    file:     &mut BufReader<File>,
    data_len: u64,
    group:    &Group,
    names:    &[S],
    num_rows: u64,
) -> Result<Vec<Vec<Cell>>> {
    names.iter()
        .map(|name| {
            let name  = name.as_ref();
            let index = group.position(name)
                .ok_or_else(|| HtyError::ColumnNotFound(name.into()))?;
            read_column(file, data_len, group, index, num_rows)
        })
        .collect()
}

/// 按 组→列 的展平顺序读出全部列（copy-rewrite 用）
pub(crate) fn read_all_columns(meta: &Metadata, path: &Path) -> Result<Vec<Vec<Cell>>> {
    let (mut file, data_len) = open_data(path)?;
    let mut out = Vec::with_capacity(meta.num_columns());
    for group in &meta.groups {
        for index in 0..group.columns.len() {
            out.push(read_column(&mut file, data_len, group, index, meta.num_rows)?);
        }
    }
    Ok(out)
}

fn matching_rows(cells: &[Cell], op: CompareOp, threshold: f32) -> Vec<RowId> {
    cells.iter()
        .enumerate()
        .filter(|(_, c)| op.matches(**c, threshold))
        .map(|(i, _)| i)
        .collect()
}

/// 按行号从投影列中取行，保持 `rows` 的顺序
///
/// 超出任一投影列长度的行号被跳过并计数，而不是整体失败。
fn gather_rows(projected: &[Vec<Cell>], rows: &[RowId]) -> (Vec<Vec<Cell>>, usize) {
    let available = projected.iter().map(Vec::len).min().unwrap_or(0);
    let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); projected.len()];
    let mut skipped = 0usize;
    for &row in rows {
        if row >= available {
            skipped += 1;
            continue;
        }
        for (out, src) in columns.iter_mut().zip(projected) {
            out.push(src[row]);
        }
    }
    (columns, skipped)
}

// ── 公开查询接口 ──────────────────────────────────────────────────────────────

/// 读取单列的全部 `num_rows` 个 Cell
#[instrument(level = "debug", skip_all, fields(column = %column))]
pub fn project_single_column<P: AsRef<Path>>(
    meta:   &Metadata,
    path:   P,
    column: &str,
) -> Result<Vec<Cell>> {
    debug!(op = "project_single_column", phase = "enter");
    let (group, index) = layout::locate(meta, column)?;
    let (mut file, data_len) = open_data(path.as_ref())?;
    let cells = read_column(&mut file, data_len, group, index, meta.num_rows)?;
    debug!(op = "project_single_column", phase = "exit", rows = cells.len());
    Ok(cells)
}

/// 多列投影；所有列必须位于同一组
#[instrument(level = "debug", skip_all, fields(columns = names.len()))]
pub fn project<P: AsRef<Path>, S: AsRef<str>>(
    meta:  &Metadata,
    path:  P,
    names: &[S],
) -> Result<ResultSet> {
    debug!(op = "project", phase = "enter");
    let group = layout::group_containing_all(meta, names)?;
    let (mut file, data_len) = open_data(path.as_ref())?;
    let columns = read_group_columns(&mut file, data_len, group, names, meta.num_rows)?;
    debug!(op = "project", phase = "exit", group_offset = group.offset, rows = meta.num_rows);
    Ok(ResultSet {
        names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        columns,
    })
}

/// 返回满足 `column op threshold` 的行号（升序）
#[instrument(level = "debug", skip_all, fields(column = %column, cmp = %op))]
pub fn filter<P: AsRef<Path>>(
    meta:      &Metadata,
    path:      P,
    column:    &str,
    op:        CompareOp,
    threshold: f32,
) -> Result<Vec<RowId>> {
    debug!(op = "filter", phase = "enter", threshold = f64::from(threshold));
    let cells = project_single_column(meta, path, column)?;
    let rows  = matching_rows(&cells, op, threshold);
    debug!(op = "filter", phase = "exit", scanned = cells.len(), matched = rows.len());
    Ok(rows)
}

/// 先过滤再投影：结果列顺序同 `names`，行顺序同过滤结果的升序行号
///
/// `names ∪ {filter_column}` 必须位于同一组，投影和过滤都针对该组。
#[instrument(level = "debug", skip_all, fields(columns = names.len(), filter_column = %filter_column))]
pub fn project_and_filter<P: AsRef<Path>, S: AsRef<str>>(
    meta:          &Metadata,
    path:          P,
    names:         &[S],
    filter_column: &str,
    op:            CompareOp,
    threshold:     f32,
) -> Result<FilteredProjection> {
    debug!(op = "project_and_filter", phase = "enter");
    let mut wanted: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    wanted.push(filter_column);
    let group = layout::group_containing_all(meta, &wanted)?;

    let (mut file, data_len) = open_data(path.as_ref())?;
    let projected = read_group_columns(&mut file, data_len, group, names, meta.num_rows)?;
    let predicate = read_group_columns(&mut file, data_len, group, &[filter_column], meta.num_rows)?;
    let rows = matching_rows(&predicate[0], op, threshold);

    let (columns, skipped) = gather_rows(&projected, &rows);
    if skipped > 0 {
        warn!(op = "project_and_filter", skipped, "filtered rows beyond projected data");
    }
    debug!(op = "project_and_filter", phase = "exit", matched = rows.len(), skipped);

    Ok(FilteredProjection {
        result: ResultSet {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            columns,
        },
        skipped_indices: skipped,
    })
}
