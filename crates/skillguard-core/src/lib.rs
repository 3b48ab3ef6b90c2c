//! 技能包校验与子代理生成核心库
//!
//! 设计要点：
//! - 规则集是不可变配置数据：内置默认 + TOML 文件按节覆盖，构造检测器时注入，
//!   便于按次替换与测试，不放在模块级可变状态里。
//! - 文档上下文判定采用“结构化预扫 + 标记窗口”：先逐行计算围栏/标题状态，
//!   再结合反模式标记的邻近窗口抑制文档示例造成的误报。
//! - 单线程顺序扫描；文件级按路径排序，文件内按行号排序，输出顺序可复现。
//! - Error 级命中令本次运行失败（非零退出）；Warning 仅提示，从不失败。

mod options;
mod types;
mod findings;
mod error;
mod rules;
mod detectors;
mod context;
mod engine;
mod scan;
mod frontmatter;
mod subagent;

// 对外暴露的稳定 API
pub use error::SkillError;
pub use options::{ValidateOptions, ValidateStats};
pub use types::{Severity, ValidationFinding};
pub use rules::{RuleSet, SecretRule};
pub use scan::{validate_dir, validate_dir_with_rules, write_findings_json, write_findings_text};
pub use frontmatter::{parse_front_matter, SkillMetadata};
pub use subagent::{generate_subagent, GeneratedSubagent, SubagentOptions};
