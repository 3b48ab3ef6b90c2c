//! 公共类型（对外暴露）
use serde::Serialize;
use std::fmt;

/// 告警级别
/// - Error：阻断性问题（密钥暴露、硬编码密钥、缺失必填字段），令本次运行失败。
/// - Warning：提示性问题（疑似项目特定术语、未记录的环境变量、超长文档），从不失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// 单条校验结果（对应文本/JSON 报告的单个元素）
/// 每次规则命中创建一条；创建后不可变，仅收集到本次运行的扁平序列中。
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFinding {
    pub severity: Severity,
    /// 相对被扫描根目录的文件路径
    pub file: String,
    /// 1 起始的行号
    pub line: usize,
    /// 命中的规则 id（如 "secret-env-exposure"、"uuid-like"）
    pub rule: String,
    pub message: String,
}
