//! 仓库发布（GitHub CLI 外部进程封装）
//!
//! `gh` 作为不透明外部进程调用，只检查其成败；前置条件不满足时尽早退出，
//! 并给出修复指引。单次执行，无重试。
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::info;

/// 发布选项
#[derive(Debug, Clone)]
pub(crate) struct PublishOptions {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) topics: Vec<String>,
    pub(crate) private: bool,
}

/// 创建并配置远端仓库
pub(crate) fn publish(path: &Path, opts: &PublishOptions) -> Result<()> {
    // 前置条件 1：gh 可用
    if which::which("gh").is_err() {
        bail!(
            "GitHub CLI (gh) not found on PATH; install it from https://cli.github.com and run `gh auth login`"
        );
    }

    // 前置条件 2：目录有已提交的历史
    let head = Command::new("git")
        .args(["rev-parse", "--verify", "HEAD"])
        .current_dir(path)
        .output()
        .with_context(|| format!("run git in {}", path.display()))?;
    if !head.status.success() {
        bail!(
            "no committed history in {}; run `git init && git add . && git commit` first",
            path.display()
        );
    }

    let visibility = if opts.private { "--private" } else { "--public" };
    let mut create = Command::new("gh");
    create
        .args(["repo", "create", &opts.name])
        .arg(visibility)
        .arg("--source")
        .arg(path)
        .arg("--push");
    if let Some(desc) = &opts.description {
        create.args(["--description", desc]);
    }
    let status = create.status().context("launch gh repo create")?;
    if !status.success() {
        bail!("gh repo create exited with {status}");
    }
    info!(repo = %opts.name, "remote repository created");

    if !opts.topics.is_empty() {
        let mut edit = Command::new("gh");
        edit.args(["repo", "edit", &opts.name]);
        for topic in &opts.topics {
            edit.args(["--add-topic", topic]);
        }
        let status = edit.status().context("launch gh repo edit")?;
        if !status.success() {
            bail!("gh repo edit exited with {status}");
        }
        info!(topics = opts.topics.len(), "topics configured");
    }

    Ok(())
}
