//! 导入编码器：由表格文本生成第一代 HTY 文件
//!
//! - 每列类型只在首个观测值上推断一次：含 `.` → float；全部由数字或 `-` 组成 → int；
//!   否则 → string。之后的值一律按该类型解析，不符即 [`HtyError::TypeMismatch`]。
//! - 所有列放进同一个组，组偏移为 0，列按表头顺序列存。

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::column_writer::ColumnWriter;
use crate::common::{HtyError, Result};
use crate::field_type::ColumnType;
use crate::meta::{ColumnMeta, Group, Metadata};
use crate::options::IngestOptions;
use crate::trailer;

/// 由首个观测值推断列类型
pub fn infer_type(value: &str) -> ColumnType {
    if value.contains('.') {
        ColumnType::Float
    } else if value.chars().all(|c| c.is_ascii_digit() || c == '-') {
        ColumnType::Int
    } else {
        ColumnType::String
    }
}

// ── TableWriter ───────────────────────────────────────────────────────────────

/// 逐行接收文本记录，完成后写出单组 HTY 文件
pub struct TableWriter {
    names:    Vec<String>,
    // 首个值到达前列类型未知
    columns:  Vec<Option<ColumnWriter>>,
    num_rows: u64,
}

impl TableWriter {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            names:    names.iter().map(|n| n.as_ref().to_string()).collect(),
            columns:  names.iter().map(|_| None).collect(),
            num_rows: 0,
        }
    }

    /// 追加一条记录，字段数必须等于列数
    pub fn append_record<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        if fields.len() != self.names.len() {
            return Err(HtyError::SchemaMismatch { expected: self.names.len(), found: fields.len() });
        }
        for ((slot, name), field) in self.columns.iter_mut().zip(&self.names).zip(fields) {
            let field = field.as_ref();
            let cw = slot.get_or_insert_with(|| {
                ColumnWriter::new(ColumnMeta::new(name, infer_type(field)))
            });
            cw.add_text(field)?;
        }
        self.num_rows += 1;
        Ok(())
    }

    pub fn num_rows(&self) -> u64 { self.num_rows }

    /// 当前的列定义；尚无数据的列按 int 处理
    pub fn schema(&self) -> Vec<ColumnMeta> {
        self.columns.iter().zip(&self.names)
            .map(|(cw, name)| match cw {
                Some(cw) => cw.meta.clone(),
                None     => ColumnMeta::int(name),
            })
            .collect()
    }

    /// 写出数据区与尾部，返回写入的元数据
    pub fn finalize<W: Write>(self, w: &mut W) -> Result<Metadata> {
        let meta = Metadata::new(self.num_rows, vec![Group::new(0, self.schema())]);
        let mut written = 0u64;
        for cw in self.columns.into_iter().flatten() {
            written += cw.finalize(w)?;
        }
        written += trailer::encode(w, &meta)?;
        debug!(op = "finalize", phase = "exit", rows = meta.num_rows, bytes = written);
        Ok(meta)
    }
}

// ── 分隔文本前端 ──────────────────────────────────────────────────────────────

fn split_line<'a>(line: &'a str, opts: &IngestOptions) -> Vec<&'a str> {
    line.split(opts.delimiter)
        .map(|f| if opts.trim_fields { f.trim() } else { f })
        .collect()
}

/// 首行为表头，其余非空行为记录
pub fn encode_delimited<R: BufRead, W: Write>(
    input:  R,
    output: &mut W,
    opts:   &IngestOptions,
) -> Result<Metadata> {
    let mut lines = input.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None       => String::new(),
    };
    let names = if header.trim_end_matches('\r').is_empty() {
        Vec::new()
    } else {
        split_line(header.trim_end_matches('\r'), opts)
    };

    let mut table = TableWriter::new(&names);
    for line in lines {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        table.append_record(&split_line(line, opts))?;
    }
    table.finalize(output)
}

/// 将分隔文本文件转换为 HTY 文件
#[instrument(
    level = "debug",
    skip_all,
    fields(input = %input.as_ref().display(), output = %output.as_ref().display()),
)]
pub fn convert_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    input:  P,
    output: Q,
    opts:   &IngestOptions,
) -> Result<Metadata> {
    debug!(op = "convert_csv", phase = "enter");
    let reader = BufReader::new(File::open(input.as_ref())?);
    let mut out = BufWriter::new(File::create(output.as_ref())?);
    let meta = encode_delimited(reader, &mut out, opts)?;
    out.flush()?;
    debug!(op = "convert_csv", phase = "exit", rows = meta.num_rows, columns = meta.num_columns());
    Ok(meta)
}
