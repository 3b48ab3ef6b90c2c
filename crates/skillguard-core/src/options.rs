//! 校验选项与统计信息（模块）
use std::path::PathBuf;

/// 校验选项
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
    /// 规则文件路径（TOML）；为空则使用内置默认规则集
    pub rules_path: Option<PathBuf>,
    /// 反模式标记的回溯窗口（行数）：标记出现在命中行上方该窗口内即视为文档上下文
    pub marker_window: usize,
    /// Markdown 文档行数上限；超过产生 Warning
    pub max_doc_lines: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            max_file_size: None,
            rules_path: None,
            marker_window: 3,
            max_doc_lines: 500,
        }
    }
}

/// 校验统计信息（便于 CLI 打印摘要）
#[derive(Debug, Default, Clone)]
pub struct ValidateStats {
    pub files_scanned: usize,
    pub errors: usize,
    pub warnings: usize,
}
