//! 核心错误类型
//!
//! 仅为调用方需要判别的失败建枚举（front-matter 解析、子代理生成）；
//! 编排与 I/O 链路上的其余错误走 anyhow。
use std::path::PathBuf;
use thiserror::Error;

/// 技能文档解析与子代理生成的可判别错误
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("no front-matter block found (document must start with a `---` delimited block)")]
    MissingFrontMatter,

    #[error("front-matter is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("front-matter is not valid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
