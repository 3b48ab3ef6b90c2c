//! 子代理定义生成（front-matter 解析 + 模板替换）
//!
//! 输入一份 SKILL.md（或含其的目录），产出 `.claude/agents/<name>.md`：
//! - description 来自技能元数据与触发短语
//! - 工具清单按正文关键词推断（Read 恒有），可用 `--tools` 覆盖
//! - dry-run 仅打印，不做任何文件系统写入
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SkillError;
use crate::frontmatter::{parse_front_matter, SkillMetadata};

/// 生成选项
#[derive(Debug, Clone, Default)]
pub struct SubagentOptions {
    /// 输出目录；缺省 `.claude/agents`
    pub output_dir: Option<PathBuf>,
    /// 工具清单覆盖；为空则按正文推断
    pub tools: Option<Vec<String>>,
    /// 仅预览，不写文件
    pub dry_run: bool,
    /// 省略结果汇报格式一节
    pub skip_output_snippet: bool,
}

/// 生成结果
#[derive(Debug, Clone)]
pub struct GeneratedSubagent {
    /// 目标路径（dry-run 时为将要写入的路径）
    pub path: PathBuf,
    pub content: String,
    /// 是否实际落盘
    pub written: bool,
}

/// 从技能文档生成子代理定义
pub fn generate_subagent(
    skill_path: &Path,
    opts: &SubagentOptions,
) -> Result<GeneratedSubagent, SkillError> {
    // 允许传目录：取其中的 SKILL.md
    let skill_file = if skill_path.is_dir() {
        skill_path.join("SKILL.md")
    } else {
        skill_path.to_path_buf()
    };
    let content = fs::read_to_string(&skill_file).map_err(|e| SkillError::Read {
        path: skill_file.clone(),
        source: e,
    })?;

    let (meta, body) = parse_front_matter(&content)?;
    let tools = match &opts.tools {
        Some(t) if !t.is_empty() => t.clone(),
        _ => infer_tools(body),
    };

    let rendered = render(&meta, &skill_file, &tools, opts.skip_output_snippet);

    let out_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(".claude/agents"));
    let out_path = out_dir.join(format!("{}.md", meta.name));

    if !opts.dry_run {
        fs::create_dir_all(&out_dir).map_err(|e| SkillError::Write {
            path: out_dir.clone(),
            source: e,
        })?;
        fs::write(&out_path, &rendered).map_err(|e| SkillError::Write {
            path: out_path.clone(),
            source: e,
        })?;
    }

    Ok(GeneratedSubagent {
        path: out_path,
        content: rendered,
        written: !opts.dry_run,
    })
}

/// 按正文关键词推断工具清单；Read 恒在首位
fn infer_tools(body: &str) -> Vec<String> {
    let lower = body.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let mut tools = vec!["Read".to_string()];
    if mentions(&["write", "writing", "edit", "editing", "create file", "modify"]) {
        tools.push("Write".to_string());
        tools.push("Edit".to_string());
    }
    if mentions(&["run ", "execute", "command", "script", "shell", "bash"]) {
        tools.push("Bash".to_string());
    }
    if mentions(&["search", "grep", "glob", "find file", "look up"]) {
        tools.push("Grep".to_string());
        tools.push("Glob".to_string());
    }
    tools
}

/// 模板替换
fn render(meta: &SkillMetadata, skill_file: &Path, tools: &[String], skip_output_snippet: bool) -> String {
    let trigger_section = if meta.triggers.is_empty() {
        "Activate when the user's request matches the skill description.".to_string()
    } else {
        meta.triggers
            .iter()
            .map(|t| format!("- \"{t}\""))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let agent_description = if meta.triggers.is_empty() {
        format!("Use this agent for the `{}` skill. {}", meta.name, meta.description)
    } else {
        format!(
            "Use this agent for the `{}` skill, triggered by phrases like {}.",
            meta.name,
            meta.triggers
                .iter()
                .map(|t| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    let mut out = format!(
        "\
---
name: {name}
description: {description}
tools: {tools}
---

You are a dedicated executor for the `{name}` skill.

{skill_description}

## When to activate

{triggers}

## Working instructions

1. Read the skill document at `{skill_path}` before acting.
2. Follow its steps exactly; do not improvise beyond the documented workflow.
3. Keep changes minimal and consistent with the skill's conventions.
",
        name = meta.name,
        description = agent_description,
        tools = tools.join(", "),
        skill_description = meta.description,
        triggers = trigger_section,
        skill_path = skill_file.display(),
    );

    if !skip_output_snippet {
        out.push_str(
            "\
\n## Output format\n\nReport results as:\n\n- **Done**: what was accomplished\n- **Files**: files created or modified\n- **Notes**: caveats or follow-ups\n",
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKILL: &str = "\
---
name: linear-sync
description: Sync issues when the user says \"sync linear\" or \"pull issues\".
---

# Linear sync

Search the tracker, then edit the local issue files.
";

    fn write_skill(dir: &Path, content: &str) -> PathBuf {
        let skill_dir = dir.join("linear-sync");
        fs::create_dir_all(&skill_dir).unwrap();
        let path = skill_dir.join("SKILL.md");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn generates_artifact_with_exact_triggers() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), SKILL);
        let opts = SubagentOptions {
            output_dir: Some(dir.path().join("agents")),
            ..Default::default()
        };
        let generated = generate_subagent(&skill, &opts).unwrap();
        assert!(generated.written);
        assert!(generated.path.ends_with("agents/linear-sync.md"));
        let on_disk = fs::read_to_string(&generated.path).unwrap();
        assert_eq!(on_disk, generated.content);
        // 触发短语逐字保留、顺序不变
        assert!(generated.content.contains("- \"sync linear\""));
        assert!(generated.content.contains("- \"pull issues\""));
    }

    #[test]
    fn accepts_skill_directory_as_input() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), SKILL);
        let opts = SubagentOptions {
            output_dir: Some(dir.path().join("agents")),
            dry_run: true,
            ..Default::default()
        };
        let generated = generate_subagent(skill.parent().unwrap(), &opts).unwrap();
        assert!(generated.content.contains("name: linear-sync"));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), SKILL);
        let out_dir = dir.path().join("agents");
        let opts = SubagentOptions {
            output_dir: Some(out_dir.clone()),
            dry_run: true,
            ..Default::default()
        };
        let generated = generate_subagent(&skill, &opts).unwrap();
        assert!(!generated.written);
        assert!(!out_dir.exists());
    }

    #[test]
    fn infers_tools_from_body_keywords() {
        let tools = infer_tools("Search the tracker, then edit the local issue files.");
        assert_eq!(tools, vec!["Read", "Write", "Edit", "Grep", "Glob"]);
        assert_eq!(infer_tools("Purely descriptive body."), vec!["Read"]);
        assert_eq!(
            infer_tools("Run the deploy script."),
            vec!["Read", "Bash"]
        );
    }

    #[test]
    fn tools_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), SKILL);
        let opts = SubagentOptions {
            output_dir: Some(dir.path().join("agents")),
            tools: Some(vec!["Read".to_string(), "Bash".to_string()]),
            dry_run: true,
            ..Default::default()
        };
        let generated = generate_subagent(&skill, &opts).unwrap();
        assert!(generated.content.contains("tools: Read, Bash"));
    }

    #[test]
    fn skip_output_snippet_omits_report_section() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), SKILL);
        let opts = SubagentOptions {
            output_dir: Some(dir.path().join("agents")),
            dry_run: true,
            skip_output_snippet: true,
            ..Default::default()
        };
        let generated = generate_subagent(&skill, &opts).unwrap();
        assert!(!generated.content.contains("## Output format"));
    }

    #[test]
    fn missing_name_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), "---\ndescription: d\n---\nbody\n");
        let err = generate_subagent(&skill, &SubagentOptions::default()).unwrap_err();
        assert!(matches!(err, SkillError::MissingField("name")));
    }

    #[test]
    fn missing_front_matter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let skill = write_skill(dir.path(), "# no front matter\n");
        let err = generate_subagent(&skill, &SubagentOptions::default()).unwrap_err();
        assert!(matches!(err, SkillError::MissingFrontMatter));
    }

    #[test]
    fn missing_input_path_fails() {
        let err = generate_subagent(Path::new("/nonexistent/SKILL.md"), &SubagentOptions::default())
            .unwrap_err();
        assert!(matches!(err, SkillError::Read { .. }));
    }
}
