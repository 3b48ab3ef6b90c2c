//! SKILL.md front-matter 解析（`---` 定界的 YAML 块）
//!
//! - `name` 为必填；`description` 供触发短语推导，生成路径同样必填。
//! - 触发短语：description 中首个 `when`（大小写不敏感）之后的引号子串，按出现顺序。
//! - 长度约束沿用宿主方的技能元数据规范：name ≤ 64、description ≤ 1024。
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::error::SkillError;
use crate::types::{Severity, ValidationFinding};

/// name 最大长度
pub const MAX_NAME_LENGTH: usize = 64;
/// description 最大长度
pub const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// 解析后的技能元数据（单次运行内只读）
#[derive(Debug, Clone)]
pub struct SkillMetadata {
    pub name: String,
    pub description: String,
    /// 自 description 推导的触发短语，保持出现顺序
    pub triggers: Vec<String>,
}

/// 宽松的 front-matter 原始结构：字段缺失由上层给出准确错误，而非 YAML 反序列化失败
#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn front_matter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^---\s*\n([\s\S]*?)\n---\s*\n?([\s\S]*)$").expect("front-matter regex")
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("quoted-phrase regex"))
}

fn when_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bwhen\b").expect("when regex"))
}

/// 解析 front-matter，返回元数据与正文
pub fn parse_front_matter(content: &str) -> Result<(SkillMetadata, &str), SkillError> {
    let (raw, body) = split_front_matter(content)?;
    let name = raw.name.filter(|s| !s.trim().is_empty()).ok_or(SkillError::MissingField("name"))?;
    let description = raw
        .description
        .filter(|s| !s.trim().is_empty())
        .ok_or(SkillError::MissingField("description"))?;
    let triggers = extract_triggers(&description);
    Ok((SkillMetadata { name, description, triggers }, body))
}

/// 切出 front-matter 块并做 YAML 反序列化；字段是否缺失交由调用方判断
fn split_front_matter(content: &str) -> Result<(RawFrontMatter, &str), SkillError> {
    let caps = front_matter_re()
        .captures(content)
        .ok_or(SkillError::MissingFrontMatter)?;
    let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    if yaml.trim().is_empty() {
        return Ok((RawFrontMatter::default(), body));
    }
    let raw: RawFrontMatter = serde_yaml::from_str(yaml)?;
    Ok((raw, body))
}

/// 自 description 提取触发短语：首个 `when` 之后的 `"..."` 子串，按出现顺序
pub(crate) fn extract_triggers(description: &str) -> Vec<String> {
    let Some(m) = when_re().find(description) else {
        return Vec::new();
    };
    let tail = &description[m.end()..];
    quoted_re()
        .captures_iter(tail)
        .map(|c| c[1].to_string())
        .collect()
}

/// 校验路径：对 SKILL.md 产出 Finding（缺必填字段为 Error，格式/长度问题为 Warning）
pub(crate) fn check_front_matter(rel: &str, content: &str) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    let push = |findings: &mut Vec<ValidationFinding>, severity, rule: &str, message: String| {
        findings.push(ValidationFinding {
            severity,
            file: rel.to_string(),
            line: 1,
            rule: rule.to_string(),
            message,
        });
    };

    let raw = match split_front_matter(content) {
        Ok((raw, _)) => raw,
        Err(SkillError::MissingFrontMatter) => {
            push(
                &mut findings,
                Severity::Error,
                "front-matter-missing",
                "SKILL.md has no front-matter block".to_string(),
            );
            return findings;
        }
        Err(e) => {
            push(
                &mut findings,
                Severity::Error,
                "front-matter-invalid",
                format!("SKILL.md front-matter is not parseable: {e}"),
            );
            return findings;
        }
    };

    match raw.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => push(
            &mut findings,
            Severity::Error,
            "front-matter-missing-field",
            "front-matter is missing required field `name`".to_string(),
        ),
        Some(name) => {
            if name.len() > MAX_NAME_LENGTH || !name_format_re().is_match(name) {
                push(
                    &mut findings,
                    Severity::Warning,
                    "front-matter-name-format",
                    format!(
                        "name `{name}` should be 1-{MAX_NAME_LENGTH} chars of lowercase letters, digits and hyphens"
                    ),
                );
            }
        }
    }

    match raw.description.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => push(
            &mut findings,
            Severity::Error,
            "front-matter-missing-field",
            "front-matter is missing required field `description`".to_string(),
        ),
        Some(desc) => {
            if desc.len() > MAX_DESCRIPTION_LENGTH {
                push(
                    &mut findings,
                    Severity::Warning,
                    "front-matter-description-length",
                    format!(
                        "description is {} chars, above the {MAX_DESCRIPTION_LENGTH} char limit",
                        desc.len()
                    ),
                );
            }
        }
    }

    findings
}

fn name_format_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("name-format regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "\
---
name: linear-sync
description: Sync issues when the user says \"sync linear\" or \"pull issues\".
---

# Linear sync

Body text.
";

    #[test]
    fn parses_metadata_and_body() {
        let (meta, body) = parse_front_matter(GOOD).unwrap();
        assert_eq!(meta.name, "linear-sync");
        assert!(body.starts_with("# Linear sync"));
    }

    #[test]
    fn trigger_round_trip_is_exact() {
        let (meta, _) = parse_front_matter(GOOD).unwrap();
        assert_eq!(meta.triggers, vec!["sync linear", "pull issues"]);
    }

    #[test]
    fn triggers_only_after_when() {
        // `when` 之前的引号子串不算触发短语
        let triggers =
            extract_triggers("Handles \"setup\" tasks when the user says \"phrase A\", \"phrase B\".");
        assert_eq!(triggers, vec!["phrase A", "phrase B"]);
        assert!(extract_triggers("No trigger keyword here \"quoted\".").is_empty());
    }

    #[test]
    fn missing_front_matter_is_detected() {
        let err = parse_front_matter("# Just a heading\n").unwrap_err();
        assert!(matches!(err, SkillError::MissingFrontMatter));
    }

    #[test]
    fn missing_name_is_a_descriptive_error() {
        let err = parse_front_matter("---\ndescription: d\n---\nbody\n").unwrap_err();
        assert!(matches!(err, SkillError::MissingField("name")));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn check_reports_missing_fields_as_errors() {
        let findings = check_front_matter("s/SKILL.md", "---\ndescription: d\n---\nbody\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.contains("`name`"));
    }

    #[test]
    fn check_reports_name_format_as_warning() {
        let findings =
            check_front_matter("s/SKILL.md", "---\nname: Bad_Name\ndescription: d\n---\nbody\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].rule, "front-matter-name-format");
    }

    #[test]
    fn check_accepts_well_formed_skill() {
        assert!(check_front_matter("s/SKILL.md", GOOD).is_empty());
    }
}
