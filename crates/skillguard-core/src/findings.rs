//! 命中项排序与分组（内部使用）
use crate::types::{Severity, ValidationFinding};

/// 对全量命中做稳定排序：文件路径升序 → 行号升序 → 规则 id 字典序升序
pub(crate) fn sort_findings_stable(findings: &mut Vec<ValidationFinding>) {
    findings.sort_by(|a, b| {
        use std::cmp::Ordering;
        match a.file.cmp(&b.file) {
            Ordering::Equal => match a.line.cmp(&b.line) {
                Ordering::Equal => a.rule.cmp(&b.rule),
                o => o,
            },
            o => o,
        }
    });
}

/// 按级别切分：先 Error 后 Warning，各自保持排序后的相对顺序
pub(crate) fn partition_by_severity(
    findings: &[ValidationFinding],
) -> (Vec<&ValidationFinding>, Vec<&ValidationFinding>) {
    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .collect();
    let warnings = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .collect();
    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, line: usize, rule: &str, severity: Severity) -> ValidationFinding {
        ValidationFinding {
            severity,
            file: file.to_string(),
            line,
            rule: rule.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn sort_is_by_file_then_line_then_rule() {
        let mut fs = vec![
            finding("b.md", 2, "x", Severity::Warning),
            finding("a.md", 9, "x", Severity::Error),
            finding("a.md", 1, "b", Severity::Warning),
            finding("a.md", 1, "a", Severity::Error),
        ];
        sort_findings_stable(&mut fs);
        let keys: Vec<(&str, usize, &str)> = fs
            .iter()
            .map(|f| (f.file.as_str(), f.line, f.rule.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("a.md", 1, "a"), ("a.md", 1, "b"), ("a.md", 9, "x"), ("b.md", 2, "x")]
        );
    }

    #[test]
    fn partition_keeps_relative_order() {
        let fs = vec![
            finding("a.md", 1, "r1", Severity::Warning),
            finding("a.md", 2, "r2", Severity::Error),
            finding("a.md", 3, "r3", Severity::Warning),
        ];
        let (errors, warnings) = partition_by_severity(&fs);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert_eq!(warnings.iter().map(|f| f.line).collect::<Vec<_>>(), vec![1, 3]);
    }
}
