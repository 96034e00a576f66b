//! 追加行：copy-rewrite
//!
//! HTY 文件写完即不可变。追加行 = 读出旧文件全部列 → 每列尾部接上新行 →
//! 写出一个新文件（新版本），源文件从不修改。写失败时目标文件不完整，
//! 由调用方丢弃。

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::column_writer::ColumnWriter;
use crate::common::{HtyError, Result};
use crate::field_type::Cell;
use crate::layout;
use crate::meta::{Group, Metadata};
use crate::options::{AppendOptions, OffsetPolicy};
use crate::query;
use crate::trailer;

/// 使用默认选项（保留旧的组偏移）追加行
pub fn add_row<P: AsRef<Path>, Q: AsRef<Path>>(
    meta:     &Metadata,
    source:   P,
    dest:     Q,
    new_rows: &[Vec<Cell>],
) -> Result<Metadata> {
    add_row_with(meta, source, dest, new_rows, &AppendOptions::default())
}

/// 将 `new_rows` 追加到 `source` 的数据之后写入 `dest`，返回新文件的元数据
///
/// 每行按 [`Metadata::flattened_columns`] 顺序给出一个 Cell。
#[instrument(
    level = "debug",
    skip_all,
    fields(source = %source.as_ref().display(), dest = %dest.as_ref().display(), rows = new_rows.len()),
)]
pub fn add_row_with<P: AsRef<Path>, Q: AsRef<Path>>(
    meta:     &Metadata,
    source:   P,
    dest:     Q,
    new_rows: &[Vec<Cell>],
    opts:     &AppendOptions,
) -> Result<Metadata> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    debug!(op = "add_row", phase = "enter", old_rows = meta.num_rows);
    ensure_distinct(source, dest)?;

    let width = meta.num_columns();
    if let Some(bad) = new_rows.iter().find(|r| r.len() != width) {
        return Err(HtyError::SchemaMismatch { expected: width, found: bad.len() });
    }

    // 1. 物化全部旧列，并在内存中接上新行（类型不符在写文件前就失败）
    let existing = query::read_all_columns(meta, source)?;
    debug!(op = "add_row", phase = "read", columns = existing.len());

    let mut writers = Vec::with_capacity(width);
    for (i, (col_meta, cells)) in meta.flattened_columns().zip(&existing).enumerate() {
        let mut cw = ColumnWriter::with_cells(col_meta.clone(), cells);
        for row in new_rows {
            cw.add_cell(row[i])?;
        }
        writers.push(cw);
    }

    // 2. 新元数据
    let mut new_meta = meta.clone();
    new_meta.num_rows = meta.num_rows.checked_add(new_rows.len() as u64)
        .ok_or_else(|| HtyError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("row count {} + {} overflows", meta.num_rows, new_rows.len()),
        )))?;
    if opts.offset_policy == OffsetPolicy::Recompute {
        recompute_offsets(&mut new_meta.groups, new_meta.num_rows)?;
    }
    new_meta.refresh_counts();

    // 3. 数据区 + 尾部
    let mut out = BufWriter::new(File::create(dest)?);
    let mut written = 0u64;
    for cw in writers {
        written += cw.finalize(&mut out)?;
    }
    written += trailer::encode(&mut out, &new_meta)?;
    out.flush()?;

    debug!(
        op = "add_row", phase = "exit",
        new_rows = new_meta.num_rows, bytes = written, policy = ?opts.offset_policy,
    );
    Ok(new_meta)
}

/// 按写出顺序把各组紧密排列，偏移溢出即元数据与任何真实文件都不符
fn recompute_offsets(groups: &mut [Group], num_rows: u64) -> Result<()> {
    let mut pos = 0u64;
    for group in groups {
        group.offset = pos;
        pos = layout::group_span(group, num_rows)
            .and_then(|span| pos.checked_add(span))
            .ok_or_else(|| HtyError::TruncatedRead {
                column:    group.columns.first().map(|c| c.name.clone()).unwrap_or_default(),
                expected:  u64::MAX,
                available: 0,
            })?;
    }
    Ok(())
}

/// 目标路径不得指向源文件本身（包括硬链接）
fn ensure_distinct(source: &Path, dest: &Path) -> Result<()> {
    if !dest.exists() {
        return Ok(());
    }
    if same_file(source, dest)? {
        return Err(HtyError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("append destination {} is the source file", dest.display()),
        )));
    }
    Ok(())
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}
