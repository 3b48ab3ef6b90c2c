//! 规则集加载（内置默认 + TOML 按节覆盖）
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 单条硬编码密钥规则（id + 正则）
#[derive(Debug, Clone, Deserialize)]
pub struct SecretRule {
    pub id: String,
    pub pattern: String,
}

impl SecretRule {
    fn new(id: &str, pattern: &str) -> Self {
        Self { id: id.to_string(), pattern: pattern.to_string() }
    }
}

/// 顶层规则文件结构；各节均可省略，省略的节沿用内置默认
#[derive(Debug, Default, Clone, Deserialize)]
struct RuleFile {
    #[serde(default)]
    project_terms: Option<Vec<String>>,
    #[serde(default)]
    placeholders: Option<Vec<String>>,
    #[serde(default)]
    doc_markers: Option<Vec<String>>,
    #[serde(default)]
    credential_suffixes: Option<Vec<String>>,
    #[serde(default)]
    secret_literals: Option<Vec<SecretRule>>,
}

/// 归一化规则集（不可变；构造 DetectorSet 时注入）
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// 组织/项目特定术语（命中为 Warning）；与部署强相关，内置默认为空
    pub project_terms: Vec<String>,
    /// 硬编码密钥字面量规则（命中为 Error）
    pub secret_literals: Vec<SecretRule>,
    /// 占位符形态（同行命中任一则抑制密钥字面量告警）
    pub placeholders: Vec<String>,
    /// 反模式/文档示例标记字面量（大小写不敏感匹配）
    pub doc_markers: Vec<String>,
    /// 凭据类环境变量名后缀（用于密钥暴露命令检测）
    pub credential_suffixes: Vec<String>,
}

impl RuleSet {
    /// 内置默认规则集
    pub fn builtin() -> Self {
        Self {
            project_terms: Vec::new(),
            secret_literals: vec![
                SecretRule::new("openai-key", r"sk-[A-Za-z0-9]{20,}"),
                SecretRule::new("github-token", r"gh[oprsu]_[A-Za-z0-9_]{36,}"),
                SecretRule::new("slack-token", r"xox[baprs]-[A-Za-z0-9-]{10,}"),
                SecretRule::new("stripe-key", r"sk_(?:live|test)_[A-Za-z0-9]{20,}"),
                SecretRule::new("aws-access-key", r"(?:A3T|AKIA|ASIA)[A-Z0-9]{16}"),
                SecretRule::new("google-api-key", r"AIza[A-Za-z0-9_\-]{30,}"),
                SecretRule::new("private-key-pem", r"-----BEGIN [A-Z ]*PRIVATE KEY-----"),
            ],
            placeholders: vec![
                r"(?i)your[-_][a-z0-9_-]+".to_string(),
                r"(?i)x{4,}".to_string(),
                r"<[^<>\n]+>".to_string(),
                r"\.\.\.".to_string(),
                r"(?i)example".to_string(),
                r"(?i)placeholder".to_string(),
                r"(?i)redacted".to_string(),
                r"(?i)changeme".to_string(),
                // 错误信息/校验调用里的引用不是真实泄漏
                r"(?i)\b(?:raise|throw|panic|assert|die)\b".to_string(),
            ],
            doc_markers: vec![
                "anti-pattern".to_string(),
                "antipattern".to_string(),
                "❌".to_string(),
                "never".to_string(),
                "don't do this".to_string(),
                "do not do this".to_string(),
                "bad example".to_string(),
                "wrong:".to_string(),
                "avoid".to_string(),
            ],
            credential_suffixes: vec![
                "KEY".to_string(),
                "TOKEN".to_string(),
                "SECRET".to_string(),
                "PASSWORD".to_string(),
                "PASSWD".to_string(),
                "CREDENTIAL".to_string(),
                "CREDENTIALS".to_string(),
                "AUTH".to_string(),
            ],
        }
    }

    /// 从 TOML 规则文件加载；文件中出现的节整体覆盖内置默认，缺席的节保留默认
    pub fn from_toml(path: &Path) -> Result<Self> {
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("read rules file {}", path.display()))?;
        let parsed: RuleFile = toml::from_str(&txt)
            .with_context(|| format!("parse rules file {}", path.display()))?;

        let mut out = Self::builtin();
        if let Some(v) = parsed.project_terms {
            out.project_terms = v;
        }
        if let Some(v) = parsed.placeholders {
            out.placeholders = v;
        }
        if let Some(v) = parsed.doc_markers {
            out.doc_markers = v;
        }
        if let Some(v) = parsed.credential_suffixes {
            out.credential_suffixes = v;
        }
        if let Some(v) = parsed.secret_literals {
            out.secret_literals = v;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_has_secret_rules_and_empty_terms() {
        let rules = RuleSet::builtin();
        assert!(rules.project_terms.is_empty());
        assert!(rules.secret_literals.iter().any(|r| r.id == "openai-key"));
        assert!(!rules.doc_markers.is_empty());
    }

    #[test]
    fn toml_overrides_only_present_sections() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "project_terms = [\"acme-corp\", \"project-neptune\"]").unwrap();
        let rules = RuleSet::from_toml(f.path()).unwrap();
        assert_eq!(rules.project_terms, vec!["acme-corp", "project-neptune"]);
        // 未覆盖的节沿用内置默认
        assert!(rules.secret_literals.iter().any(|r| r.id == "aws-access-key"));
    }

    #[test]
    fn toml_secret_literals_replace_builtin() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[[secret_literals]]").unwrap();
        writeln!(f, "id = \"custom\"").unwrap();
        writeln!(f, "pattern = \"tok_[a-z]{{8}}\"").unwrap();
        let rules = RuleSet::from_toml(f.path()).unwrap();
        assert_eq!(rules.secret_literals.len(), 1);
        assert_eq!(rules.secret_literals[0].id, "custom");
    }

    #[test]
    fn missing_rules_file_is_an_error() {
        assert!(RuleSet::from_toml(Path::new("/nonexistent/rules.toml")).is_err());
    }
}
