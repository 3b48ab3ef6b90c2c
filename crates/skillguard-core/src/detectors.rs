//! 检测器集合（由规则集编译而来）
//!
//! 规则集是纯数据；此处一次性编译为正则与 Aho-Corasick 自动机，
//! 同一次运行内全程复用。编译失败（用户规则写错正则）立即报错并指明规则。
use anyhow::{anyhow, Context, Result};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use regex::Regex;

use crate::rules::RuleSet;

/// 知名 shell 变量：环境变量文档检查不追究
pub(crate) const WELL_KNOWN_VARS: &[&str] = &[
    "PATH", "HOME", "PWD", "OLDPWD", "SHELL", "USER", "LOGNAME", "TERM", "LANG",
    "LC_ALL", "EDITOR", "VISUAL", "TMPDIR", "HOSTNAME", "IFS", "RANDOM", "SECONDS",
    "LINENO", "OSTYPE", "RUST_LOG",
];

/// 编译后的检测器集合
#[derive(Debug)]
pub(crate) struct DetectorSet {
    /// 项目特定术语自动机；术语列表为空时为 None
    pub(crate) project_terms: Option<AhoCorasick>,
    /// 与自动机模式索引一一对应的术语原文（用于报告）
    pub(crate) project_term_texts: Vec<String>,
    /// UUID 形字符串
    pub(crate) uuid: Regex,
    /// 密钥暴露命令（echo/printf/printenv/env|grep 打印凭据类变量），捕获组 1 为变量名
    pub(crate) secret_cmds: Vec<Regex>,
    /// 硬编码密钥字面量（规则 id + 正则）
    pub(crate) secret_literals: Vec<(String, Regex)>,
    /// 占位符形态（同行命中任一则抑制密钥字面量告警）
    pub(crate) placeholders: Vec<Regex>,
    /// 反模式标记自动机（大小写不敏感）
    pub(crate) markers: AhoCorasick,
    /// 环境变量引用（$VAR / ${VAR}），捕获组 1 为变量名
    pub(crate) env_ref: Regex,
}

impl DetectorSet {
    /// 从规则集构建检测器集合
    pub(crate) fn from_rules(rules: &RuleSet) -> Result<Self> {
        let project_terms = if rules.project_terms.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .ascii_case_insensitive(true)
                    .build(&rules.project_terms)
                    .map_err(|e| anyhow!("build project-term automaton: {e}"))?,
            )
        };

        let mut secret_literals = Vec::with_capacity(rules.secret_literals.len());
        for r in &rules.secret_literals {
            let rx = Regex::new(&r.pattern)
                .with_context(|| format!("compile secret-literal rule `{}`", r.id))?;
            secret_literals.push((r.id.clone(), rx));
        }

        let mut placeholders = Vec::with_capacity(rules.placeholders.len());
        for p in &rules.placeholders {
            placeholders.push(
                Regex::new(p).with_context(|| format!("compile placeholder pattern `{p}`"))?,
            );
        }

        let markers = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(&rules.doc_markers)
            .map_err(|e| anyhow!("build doc-marker automaton: {e}"))?;

        let suffix_alt = rules.credential_suffixes.join("|");
        let secret_cmds = vec![
            // echo $LINEAR_API_KEY / printf "${API_TOKEN}"
            Regex::new(&format!(
                r"(?:\becho\b|\bprintf\b)[^\n]*\$\{{?([A-Z][A-Z0-9_]*(?:{suffix_alt}))\b"
            ))
            .context("compile echo/printf exposure pattern")?,
            // printenv API_SECRET
            Regex::new(&format!(
                r"\bprintenv\b\s+([A-Z][A-Z0-9_]*(?:{suffix_alt}))\b"
            ))
            .context("compile printenv exposure pattern")?,
            // env | grep TOKEN
            Regex::new(&format!(
                r"\benv\b\s*\|\s*grep\b[^\n]*\b([A-Z][A-Z0-9_]*(?:{suffix_alt}))\b"
            ))
            .context("compile env|grep exposure pattern")?,
        ];

        Ok(Self {
            project_terms,
            project_term_texts: rules.project_terms.clone(),
            uuid: Regex::new(
                r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
            )
            .context("compile uuid pattern")?,
            secret_cmds,
            secret_literals,
            placeholders,
            markers,
            env_ref: Regex::new(r"\$\{?([A-Z][A-Z0-9_]{2,})\}?")
                .context("compile env-ref pattern")?,
        })
    }

    /// 该行是否呈占位符形态（抑制密钥字面量告警）
    pub(crate) fn line_is_placeholder(&self, line: &str) -> bool {
        self.placeholders.iter().any(|p| p.is_match(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_compile() {
        let det = DetectorSet::from_rules(&RuleSet::builtin()).unwrap();
        assert!(det.project_terms.is_none());
        assert_eq!(det.secret_literals.len(), 7);
    }

    #[test]
    fn bad_user_pattern_is_rejected_with_rule_id() {
        let mut rules = RuleSet::builtin();
        rules.secret_literals.push(crate::rules::SecretRule {
            id: "broken".to_string(),
            pattern: "([unclosed".to_string(),
        });
        let err = DetectorSet::from_rules(&rules).unwrap_err();
        assert!(format!("{err:#}").contains("broken"));
    }

    #[test]
    fn exposure_pattern_captures_variable_name() {
        let det = DetectorSet::from_rules(&RuleSet::builtin()).unwrap();
        let caps = det.secret_cmds[0].captures("echo $LINEAR_API_KEY").unwrap();
        assert_eq!(&caps[1], "LINEAR_API_KEY");
        let caps = det.secret_cmds[0].captures(r#"printf "${SLACK_BOT_TOKEN}""#).unwrap();
        assert_eq!(&caps[1], "SLACK_BOT_TOKEN");
        // 非凭据后缀不命中
        assert!(det.secret_cmds[0].captures("echo $BUILD_DIR").is_none());
    }

    #[test]
    fn placeholder_shapes_match() {
        let det = DetectorSet::from_rules(&RuleSet::builtin()).unwrap();
        assert!(det.line_is_placeholder("OPENAI_API_KEY=sk-your-key-here"));
        assert!(det.line_is_placeholder("token = \"sk-xxxxxxxxxxxxxxxxxxxxxxxx\""));
        assert!(det.line_is_placeholder("export KEY=<your key>"));
        assert!(!det.line_is_placeholder("export KEY=sk-T3BlbkFJa1b2c3d4e5f6g7h8"));
    }
}
