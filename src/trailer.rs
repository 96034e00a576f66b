//! 元数据尾部编解码
//!
//! 文件格式：
//! ```text
//! ┌────────────────────────────────────┐
//! │  DATA REGION                       │
//! │    [Group 0: col 0 | col 1 | ...]  │ ← 每列 num_rows × 4 字节
//! │    [Group 1: ...]                  │
//! ├────────────────────────────────────┤
//! │  TRAILER                           │
//! │    Metadata JSON   (L bytes)       │
//! │    Metadata length (u32 LE) = L    │
//! └────────────────────────────────────┘
//! ```
//!
//! 没有 magic、版本号或校验和：尾部损坏只能通过长度越界或 JSON 解析失败发现。

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, instrument};

use crate::common::{HtyError, Result};
use crate::meta::Metadata;

/// 尾部长度字段宽度
pub const TRAILER_LEN_BYTES: u64 = 4;

// ── 定位 ──────────────────────────────────────────────────────────────────────

/// 尾部的物理位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerLocation {
    pub file_size:    u64,
    /// 元数据文档长度 L
    pub metadata_len: u64,
}

impl TrailerLocation {
    /// 元数据文档起始偏移，同时也是数据区的长度
    pub fn data_len(&self) -> u64 {
        self.file_size - self.metadata_len - TRAILER_LEN_BYTES
    }
}

/// 读取最后 4 字节并校验 L 不超过 `file_size - 4`
pub fn locate<R: Read + Seek>(r: &mut R) -> Result<TrailerLocation> {
    let file_size = r.seek(SeekFrom::End(0))?;
    if file_size < TRAILER_LEN_BYTES {
        return Err(HtyError::CorruptTrailer(
            format!("file is {file_size} bytes, shorter than the length field"),
        ));
    }
    r.seek(SeekFrom::Start(file_size - TRAILER_LEN_BYTES))?;
    let metadata_len = r.read_u32::<LittleEndian>()? as u64;
    if metadata_len > file_size - TRAILER_LEN_BYTES {
        return Err(HtyError::CorruptTrailer(
            format!("metadata length {metadata_len} exceeds file size {file_size}"),
        ));
    }
    Ok(TrailerLocation { file_size, metadata_len })
}

// ── 解码 ──────────────────────────────────────────────────────────────────────

/// 从任意可 seek 的字节流解码元数据
pub fn decode<R: Read + Seek>(r: &mut R) -> Result<Metadata> {
    let loc = locate(r)?;
    r.seek(SeekFrom::Start(loc.data_len()))?;
    let mut doc = vec![0u8; loc.metadata_len as usize];
    r.read_exact(&mut doc)?;
    serde_json::from_slice(&doc)
        .map_err(|e| HtyError::CorruptTrailer(format!("cannot parse metadata: {e}")))
}

/// 打开 HTY 文件并解码其尾部元数据
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    debug!(op = "read_metadata", phase = "enter");
    let mut file = File::open(path.as_ref())?;
    let meta = decode(&mut file)?;
    debug!(
        op = "read_metadata", phase = "exit",
        num_rows = meta.num_rows, groups = meta.groups.len(),
    );
    Ok(meta)
}

// ── 编码 ──────────────────────────────────────────────────────────────────────

/// 在已写好的数据区之后追加元数据文档和 4 字节长度，返回写入的尾部字节数
pub fn encode<W: Write>(w: &mut W, meta: &Metadata) -> Result<u64> {
    let doc = serde_json::to_vec(meta).map_err(io::Error::from)?;
    let len = length_field(doc.len())?;
    w.write_all(&doc)?;
    w.write_u32::<LittleEndian>(len)?;
    Ok(doc.len() as u64 + TRAILER_LEN_BYTES)
}

/// 文档长度必须能放进 4 字节长度字段
fn length_field(doc_len: usize) -> Result<u32> {
    u32::try_from(doc_len).map_err(|_| {
        HtyError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("metadata document is {doc_len} bytes, too large for the length field"),
        ))
    })
}
