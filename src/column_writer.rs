//! 列写入器
//!
//! 每列独立缓冲自己的 Cell，完成后按列存顺序整体写出（小端 4 字节）。

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::common::{HtyError, Result, CELL_BYTES};
use crate::field_type::{Cell, ColumnType};
use crate::meta::ColumnMeta;

pub struct ColumnWriter {
    pub meta:   ColumnMeta,
    cells:      Vec<i32>,
    // 逻辑值个数；string 列一个值占多个 Cell
    num_values: u64,
}

impl ColumnWriter {
    pub fn new(meta: ColumnMeta) -> Self {
        Self { meta, cells: Vec::new(), num_values: 0 }
    }

    /// 以已有数据开头（copy-rewrite 时的旧列内容）
    pub fn with_cells(meta: ColumnMeta, existing: &[Cell]) -> Self {
        let cells = existing.iter().map(|c| c.raw()).collect();
        Self { meta, cells, num_values: existing.len() as u64 }
    }

    /// 追加一个已打标签的 Cell；其种类必须与列声明类型一致
    pub fn add_cell(&mut self, cell: Cell) -> Result<()> {
        if !cell.fits(self.meta.column_type) {
            return Err(HtyError::TypeMismatch {
                column:   self.meta.name.clone(),
                value:    format!("{cell:?}"),
                expected: self.meta.column_type,
            });
        }
        self.cells.push(cell.raw());
        self.num_values += 1;
        Ok(())
    }

    /// 按列的固定类型解析一个文本值
    pub fn add_text(&mut self, value: &str) -> Result<()> {
        match self.meta.column_type {
            ColumnType::Int => {
                let v = value.parse::<i32>().map_err(|_| self.mismatch(value))?;
                self.cells.push(v);
            }
            ColumnType::Float => {
                let v = value.parse::<f32>().map_err(|_| self.mismatch(value))?;
                self.cells.push(Cell::from_f32(v).raw());
            }
            ColumnType::String => {
                // 每个 UTF-8 字节一个 Cell，按有符号字节扩展（>= 0x80 的字节为负值）
                self.cells.extend(value.bytes().map(|b| i32::from(b as i8)));
                self.cells.push(0);
            }
        }
        self.num_values += 1;
        Ok(())
    }

    fn mismatch(&self, value: &str) -> HtyError {
        HtyError::TypeMismatch {
            column:   self.meta.name.clone(),
            value:    value.into(),
            expected: self.meta.column_type,
        }
    }

    pub fn num_values(&self) -> u64 { self.num_values }
    pub fn num_cells(&self)  -> u64 { self.cells.len() as u64 }

    /// 本列写出后占用的字节数
    pub fn byte_len(&self) -> u64 { self.num_cells() * CELL_BYTES }

    /// 写出全部 Cell，返回写入字节数
    pub fn finalize<W: Write>(self, w: &mut W) -> Result<u64> {
        for v in &self.cells {
            w.write_i32::<LittleEndian>(*v)?;
        }
        Ok(self.byte_len())
    }
}
