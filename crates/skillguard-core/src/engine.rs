//! 单文件扫描引擎（逐遍应用检测器）
//!
//! 遍次顺序与抑制关系：
//! 1. 项目特定泄漏（术语 + UUID 形）→ Warning；文档上下文抑制
//! 2. 密钥暴露命令 → Error；文档上下文抑制
//! 3. 硬编码密钥字面量 → Error；占位符形态或文档上下文抑制
//! 4. 环境变量文档检查（仅 Markdown）→ Warning
//! 5. 文档规模检查（仅 Markdown）→ Warning
//! 6. front-matter 检查（仅 SKILL.md）
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::context::annotate_lines;
use crate::detectors::{DetectorSet, WELL_KNOWN_VARS};
use crate::frontmatter;
use crate::options::ValidateOptions;
use crate::types::{Severity, ValidationFinding};

/// 被扫描文件的种类（按扩展名判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    Markdown,
    Script,
}

/// 扫描单个文件
/// - 读取为字节后有损转换为 UTF-8，编码异常不导致漏扫
/// - 返回的命中未排序，由上层统一排序
pub(crate) fn scan_file(
    path: &Path,
    rel: &str,
    kind: FileKind,
    detectors: &DetectorSet,
    opts: &ValidateOptions,
) -> Result<Vec<ValidationFinding>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf);

    let is_skill_file = path.file_name().and_then(|s| s.to_str()) == Some("SKILL.md");
    Ok(scan_text(rel, &text, kind, is_skill_file, detectors, opts))
}

/// 对已读入的文本执行全部遍次（与文件系统解耦，便于测试）
pub(crate) fn scan_text(
    rel: &str,
    text: &str,
    kind: FileKind,
    is_skill_file: bool,
    detectors: &DetectorSet,
    opts: &ValidateOptions,
) -> Vec<ValidationFinding> {
    let lines: Vec<&str> = text.lines().collect();
    let ctx = annotate_lines(&lines, &detectors.markers, opts.marker_window);

    let mut findings = Vec::new();
    let push = |findings: &mut Vec<ValidationFinding>,
                severity: Severity,
                line: usize,
                rule: &str,
                message: String| {
        findings.push(ValidationFinding {
            severity,
            file: rel.to_string(),
            line,
            rule: rule.to_string(),
            message,
        });
    };

    for (i, line) in lines.iter().enumerate() {
        let lineno = i + 1;
        let documented = ctx[i].is_documentation();

        // 遍 1：项目特定泄漏
        if !documented {
            if let Some(ac) = &detectors.project_terms {
                let mut seen_pat = Vec::new();
                for m in ac.find_iter(*line) {
                    let pid = m.pattern().as_usize();
                    if seen_pat.contains(&pid) {
                        continue;
                    }
                    seen_pat.push(pid);
                    let term = &detectors.project_term_texts[pid];
                    push(
                        &mut findings,
                        Severity::Warning,
                        lineno,
                        "project-term",
                        format!("possible project-specific term `{term}`"),
                    );
                }
            }
            if detectors.uuid.is_match(line) {
                push(
                    &mut findings,
                    Severity::Warning,
                    lineno,
                    "uuid-like",
                    "UUID-shaped identifier may be project-specific".to_string(),
                );
            }
        }

        // 遍 2：密钥暴露命令
        if !documented {
            for re in &detectors.secret_cmds {
                if let Some(caps) = re.captures(line) {
                    let var = caps.get(1).map(|m| m.as_str()).unwrap_or("?");
                    push(
                        &mut findings,
                        Severity::Error,
                        lineno,
                        "secret-env-exposure",
                        format!("command prints credential-suggesting variable `{var}`"),
                    );
                    break; // 同一行只报一次
                }
            }
        }

        // 遍 3：硬编码密钥字面量
        if !documented && !detectors.line_is_placeholder(line) {
            for (id, re) in &detectors.secret_literals {
                if re.is_match(line) {
                    push(
                        &mut findings,
                        Severity::Error,
                        lineno,
                        "hardcoded-secret",
                        format!("hardcoded secret literal matches rule `{id}`"),
                    );
                }
            }
        }
    }

    if kind == FileKind::Markdown {
        check_env_documentation(rel, &lines, &ctx, detectors, &mut findings);

        // 遍 5：文档规模
        if lines.len() > opts.max_doc_lines {
            push(
                &mut findings,
                Severity::Warning,
                lines.len(),
                "oversized-doc",
                format!(
                    "document has {} lines, above the {} line guideline",
                    lines.len(),
                    opts.max_doc_lines
                ),
            );
        }
    }

    if is_skill_file {
        findings.extend(frontmatter::check_front_matter(rel, text));
    }

    findings
}

/// 遍 4：围栏代码块里引用的环境变量必须在正文有说明
///
/// “有说明”定义为变量名出现在任意围栏外的行；知名 shell 变量与文档示例除外。
/// 每个变量只报一次，定位在首次引用行。
fn check_env_documentation(
    rel: &str,
    lines: &[&str],
    ctx: &[crate::context::LineContext],
    detectors: &DetectorSet,
    findings: &mut Vec<ValidationFinding>,
) {
    // 变量 -> 首次引用行号（BTreeMap 保证报告顺序稳定）
    let mut first_use: BTreeMap<String, usize> = BTreeMap::new();
    for (i, line) in lines.iter().enumerate() {
        if !ctx[i].in_fence || ctx[i].is_documentation() {
            continue;
        }
        for caps in detectors.env_ref.captures_iter(line) {
            let name = &caps[1];
            if WELL_KNOWN_VARS.contains(&name) {
                continue;
            }
            first_use.entry(name.to_string()).or_insert(i + 1);
        }
    }
    if first_use.is_empty() {
        return;
    }

    for (name, lineno) in first_use {
        let documented = lines
            .iter()
            .enumerate()
            .any(|(i, l)| !ctx[i].in_fence && l.contains(&name));
        if !documented {
            findings.push(ValidationFinding {
                severity: Severity::Warning,
                file: rel.to_string(),
                line: lineno,
                rule: "undocumented-env".to_string(),
                message: format!(
                    "environment variable `{name}` is used in a code block but never documented"
                ),
            });
        }
    }
}
