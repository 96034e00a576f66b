//! 写路径配置

/// 追加行后各组 `offset` 的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetPolicy {
    /// 沿用旧文件的组偏移（历史格式行为）
    ///
    /// 只有单组且从 0 开始的文件在追加后仍满足布局不变式；多组文件的偏移会失效。
    #[default]
    Preserve,
    /// 按新文件中各组实际写入的位置重算偏移（格式层面的行为变更）
    Recompute,
}

#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    pub offset_policy: OffsetPolicy,
}

impl AppendOptions {
    pub fn with_offset_policy(mut self, policy: OffsetPolicy) -> Self {
        self.offset_policy = policy; self
    }
}

/// 分隔文本导入选项
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub delimiter:   char,
    /// 解析前去掉字段两端空白
    pub trim_fields: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: ',', trim_fields: false }
    }
}

impl IngestOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter; self
    }
    pub fn trimmed(mut self) -> Self {
        self.trim_fields = true; self
    }
}
