use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use skillguard_core::{
    generate_subagent, validate_dir, write_findings_json, write_findings_text, SubagentOptions,
    ValidateOptions,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

mod publish;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "skillguard", version, about = "技能包校验与子代理生成工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验技能目录：Error 命中则退出码为 1
    Validate {
        /// 待校验的根目录
        path: PathBuf,

        /// 规则文件路径（TOML）；缺省使用内置默认规则集
        #[arg(long)]
        rules: Option<PathBuf>,

        /// 报告格式
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// 最大扫描文件大小（单位字节，例如 5242880 代表 5MB）
        #[arg(long)]
        max_file_size: Option<u64>,
    },

    /// 从 SKILL.md 生成子代理定义
    GenerateSubagent {
        /// SKILL.md 路径，或包含它的技能目录
        skill_path: PathBuf,

        /// 输出目录（缺省 .claude/agents）
        #[arg(long)]
        output: Option<PathBuf>,

        /// 工具清单覆盖（逗号分隔，例如 "Read,Bash"）；缺省按正文推断
        #[arg(long)]
        tools: Option<String>,

        /// 仅打印预览，不写任何文件
        #[arg(long)]
        dry_run: bool,

        /// 省略结果汇报格式一节
        #[arg(long)]
        skip_output_snippet: bool,
    },

    /// 通过 GitHub CLI 为技能包创建并配置远端仓库
    Publish {
        /// 技能包所在目录（需已有提交历史）
        path: PathBuf,

        /// 远端仓库名
        #[arg(long)]
        name: String,

        /// 仓库描述
        #[arg(long)]
        description: Option<String>,

        /// 主题列表（逗号分隔）
        #[arg(long)]
        topics: Option<String>,

        /// 创建私有仓库（缺省公开）
        #[arg(long)]
        private: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, rules, format, max_file_size } => {
            info!(?path, "starting validation");

            let opts = ValidateOptions {
                max_file_size,
                rules_path: rules,
                ..Default::default()
            };
            let (findings, stats) = validate_dir(&path, &opts).context("validation failed")?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            match format {
                ReportFormat::Text => write_findings_text(&findings, &stats, &mut out)?,
                ReportFormat::Json => {
                    write_findings_json(&findings, &mut out)?;
                    writeln!(out)?;
                }
            }
            out.flush().ok();

            info!(
                files_scanned = stats.files_scanned,
                errors = stats.errors,
                warnings = stats.warnings,
                "validation finished"
            );
            if stats.errors > 0 {
                std::process::exit(1);
            }
        }

        Commands::GenerateSubagent { skill_path, output, tools, dry_run, skip_output_snippet } => {
            let opts = SubagentOptions {
                output_dir: output,
                tools: tools.map(|csv| {
                    csv.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                }),
                dry_run,
                skip_output_snippet,
            };
            let generated = generate_subagent(&skill_path, &opts)
                .with_context(|| format!("generate subagent from {}", skill_path.display()))?;

            if dry_run {
                print!("{}", generated.content);
            } else {
                info!(path = %generated.path.display(), "subagent written");
                println!("{}", generated.path.display());
            }
        }

        Commands::Publish { path, name, description, topics, private } => {
            let topics = topics
                .map(|csv| {
                    csv.split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let opts = publish::PublishOptions { name, description, topics, private };
            publish::publish(&path, &opts)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
