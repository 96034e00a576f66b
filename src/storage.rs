//! HTY 文件句柄
//!
//! `HtyTable` 只是 (路径, 打开时解码的元数据) 的组合。文件不可变，元数据也就不会过期；
//! 每次 `open` 都重新从尾部解码，句柄之间不共享任何缓存。

use std::path::{Path, PathBuf};

use crate::common::{Result, RowId};
use crate::field_type::Cell;
use crate::ingest;
use crate::meta::Metadata;
use crate::mutation;
use crate::options::{AppendOptions, IngestOptions};
use crate::predicate::CompareOp;
use crate::query::{self, FilteredProjection, ResultSet};
use crate::trailer;

#[derive(Debug, Clone)]
pub struct HtyTable {
    path: PathBuf,
    meta: Metadata,
}

impl HtyTable {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = trailer::read_metadata(&path)?;
        Ok(Self { path, meta })
    }

    /// 由分隔文本生成新文件并打开
    pub fn create_from_csv<P: AsRef<Path>, Q: AsRef<Path>>(
        csv:  P,
        path: Q,
        opts: &IngestOptions,
    ) -> Result<Self> {
        let meta = ingest::convert_csv(csv, path.as_ref(), opts)?;
        Ok(Self { path: path.as_ref().to_path_buf(), meta })
    }

    pub fn path(&self)     -> &Path     { &self.path }
    pub fn metadata(&self) -> &Metadata { &self.meta }
    pub fn num_rows(&self) -> u64       { self.meta.num_rows }

    pub fn column(&self, name: &str) -> Result<Vec<Cell>> {
        query::project_single_column(&self.meta, &self.path, name)
    }

    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<ResultSet> {
        query::project(&self.meta, &self.path, names)
    }

    /// 投影所有列；只有单组文件才会成功
    pub fn project_all(&self) -> Result<ResultSet> {
        self.project(&self.meta.column_names())
    }

    pub fn filter(&self, column: &str, op: CompareOp, threshold: f32) -> Result<Vec<RowId>> {
        query::filter(&self.meta, &self.path, column, op, threshold)
    }

    pub fn project_and_filter<S: AsRef<str>>(
        &self,
        names:         &[S],
        filter_column: &str,
        op:            CompareOp,
        threshold:     f32,
    ) -> Result<FilteredProjection> {
        query::project_and_filter(&self.meta, &self.path, names, filter_column, op, threshold)
    }

    /// copy-rewrite 追加，返回新版本文件的句柄；`self` 指向的文件不变
    pub fn append<P: AsRef<Path>>(
        &self,
        dest: P,
        rows: &[Vec<Cell>],
        opts: &AppendOptions,
    ) -> Result<Self> {
        let meta = mutation::add_row_with(&self.meta, &self.path, dest.as_ref(), rows, opts)?;
        Ok(Self { path: dest.as_ref().to_path_buf(), meta })
    }
}
