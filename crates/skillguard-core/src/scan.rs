//! 扫描主流程（目录遍历 + 汇总与报告输出）
use anyhow::{bail, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::detectors::DetectorSet;
use crate::engine::{scan_file, FileKind};
use crate::findings::{partition_by_severity, sort_findings_stable};
use crate::options::{ValidateOptions, ValidateStats};
use crate::rules::RuleSet;
use crate::types::ValidationFinding;

/// 参与扫描的扩展名：Markdown 与脚本类源文件；其余（含二进制）一律跳过
const MARKDOWN_EXTS: &[&str] = &["md"];
const SCRIPT_EXTS: &[&str] = &["sh", "bash", "zsh", "py", "js", "ts"];

/// 校验目录并返回全量命中与统计
/// 稳定性保证：
/// - 文件级：先收集文件并按路径排序，确保输出顺序可复现
/// - 文件内：命中按 (行号升序, 规则 id 升序) 排序
///
/// 规则集来源：`opts.rules_path` 指定的 TOML 文件，缺省为内置默认。
pub fn validate_dir(root: &Path, opts: &ValidateOptions) -> Result<(Vec<ValidationFinding>, ValidateStats)> {
    let rules = match &opts.rules_path {
        Some(p) => RuleSet::from_toml(p)?,
        None => RuleSet::builtin(),
    };
    validate_dir_with_rules(root, &rules, opts)
}

/// 同 [`validate_dir`]，但规则集由调用方注入（按次替换、测试友好）
pub fn validate_dir_with_rules(
    root: &Path,
    rules: &RuleSet,
    opts: &ValidateOptions,
) -> Result<(Vec<ValidationFinding>, ValidateStats)> {
    if !root.exists() {
        bail!("input path {} does not exist", root.display());
    }
    let detectors = DetectorSet::from_rules(rules)?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_hidden_dir(e))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if entry.file_type().is_file() && file_kind(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    // 按路径排序，确保输出顺序稳定
    files.sort();

    let mut stats = ValidateStats::default();
    let mut findings: Vec<ValidationFinding> = Vec::new();

    for path in files {
        if let Some(max) = opts.max_file_size {
            if let Ok(md) = std::fs::metadata(&path) {
                if md.len() > max {
                    continue;
                }
            }
        }
        let kind = match file_kind(&path) {
            Some(k) => k,
            None => continue,
        };
        let rel = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        match scan_file(&path, &rel, kind, &detectors, opts) {
            Ok(fs) => {
                stats.files_scanned += 1;
                findings.extend(fs);
            }
            // 读不出来的文件跳过，不让单个坏文件中断整次运行
            Err(_) => continue,
        }
    }

    sort_findings_stable(&mut findings);
    let (errors, warnings) = partition_by_severity(&findings);
    stats.errors = errors.len();
    stats.warnings = warnings.len();
    Ok((findings, stats))
}

/// 文本报告：先 Error 后 Warning，最后一行摘要计数
pub fn write_findings_text(
    findings: &[ValidationFinding],
    stats: &ValidateStats,
    out: &mut dyn Write,
) -> Result<()> {
    let (errors, warnings) = partition_by_severity(findings);
    for f in errors.iter().chain(warnings.iter()) {
        writeln!(out, "{}: {}:{}: {} [{}]", f.severity, f.file, f.line, f.message, f.rule)?;
    }
    writeln!(
        out,
        "{} error(s), {} warning(s), {} file(s) scanned",
        stats.errors, stats.warnings, stats.files_scanned
    )?;
    Ok(())
}

/// JSON 报告：命中项的流式 JSON 数组（Error 在前，Warning 在后）
pub fn write_findings_json(findings: &[ValidationFinding], out: &mut dyn Write) -> Result<()> {
    let (errors, warnings) = partition_by_severity(findings);
    write!(out, "[")?;
    let mut first = true;
    for f in errors.iter().chain(warnings.iter()) {
        if !first {
            write!(out, ",")?;
        } else {
            first = false;
        }
        serde_json::to_writer(&mut *out, f)?;
    }
    write!(out, "]")?;
    Ok(())
}

/// 隐藏目录（`.git`、`.claude` 等）不参与扫描；根目录自身除外，
/// 否则无法直接校验形如 `.claude/skills` 的路径
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// 按扩展名判定文件种类；None 表示不扫描
fn file_kind(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if MARKDOWN_EXTS.contains(&ext.as_str()) {
        Some(FileKind::Markdown)
    } else if SCRIPT_EXTS.contains(&ext.as_str()) {
        Some(FileKind::Script)
    } else {
        None
    }
}
