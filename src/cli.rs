// ==========================================
// 委员会席位分配系统 - 命令行
// ==========================================
// 子命令: allocate / lock-member / set-weight / compare
// 红线: 命令行层只做装配与输出，错误用 anyhow 附加上下文
// ==========================================

use crate::config::EngineConfig;
use crate::engine::orchestrator::{allocate_with_config, AllocationResult};
use crate::export::{compare_dirs, export_result, ExportFormat};
use crate::importer::{load_committees, load_people, load_rules, load_scenario, save_scenario};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Committee Manager 命令行
#[derive(Debug, Parser)]
#[command(name = "committee-manager")]
#[command(about = "Allocate people to committees under declarative rules", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "COMMITTEE_MANAGER_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run allocation and write allocation/rationale files
    Allocate {
        /// People CSV path
        #[arg(long)]
        people: PathBuf,

        /// Committees CSV path
        #[arg(long)]
        committees: PathBuf,

        /// Rules YAML path
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Scenario YAML path
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Engine config YAML path
        #[arg(long, env = "COMMITTEE_MANAGER_CONFIG")]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Yaml)]
        format: ExportFormat,
    },

    /// Lock a person to a committee in a scenario file
    LockMember {
        scenario: PathBuf,
        committee: String,
        person: String,
    },

    /// Override a soft rule weight in a scenario file
    SetWeight {
        scenario: PathBuf,
        rule: String,
        #[arg(allow_hyphen_values = true)]
        weight: f64,
    },

    /// Compare two allocation output directories
    Compare { dir1: PathBuf, dir2: PathBuf },
}

/// 执行子命令，返回要打印到 stdout 的文本
pub fn run(command: &Commands) -> anyhow::Result<String> {
    match command {
        Commands::Allocate {
            people,
            committees,
            rules,
            scenario,
            config,
            output,
            format,
        } => {
            let request = AllocateRequest {
                people,
                committees,
                rules: rules.as_deref(),
                scenario: scenario.as_deref(),
                config: config.as_deref(),
            };
            let result = run_allocation(&request)?;
            let paths = export_result(&result, output, *format)
                .with_context(|| format!("写出结果失败: {}", output.display()))?;

            let mut text = format!(
                "Wrote allocation to {} and rationale to {}",
                paths.allocation.display(),
                paths.rationale.display()
            );
            for issue in &result.issues {
                text.push_str(&format!("\n  ! {}", issue));
            }
            Ok(text)
        }
        Commands::LockMember {
            scenario,
            committee,
            person,
        } => {
            let mut current = load_scenario(scenario).with_context(|| format!("读取场景失败: {}", scenario.display()))?;
            current.lock(committee, person);
            save_scenario(scenario, &current).with_context(|| format!("保存场景失败: {}", scenario.display()))?;
            info!(%committee, %person, "已添加锁定");
            Ok(format!("Locked {} to {} in {}", person, committee, scenario.display()))
        }
        Commands::SetWeight { scenario, rule, weight } => {
            if !weight.is_finite() {
                anyhow::bail!("权重必须是有限数: {}", weight);
            }
            let mut current = load_scenario(scenario).with_context(|| format!("读取场景失败: {}", scenario.display()))?;
            current.set_weight(rule, *weight);
            save_scenario(scenario, &current).with_context(|| format!("保存场景失败: {}", scenario.display()))?;
            info!(%rule, weight, "已覆写权重");
            Ok(format!("Set weight of {} to {} in {}", rule, weight, scenario.display()))
        }
        Commands::Compare { dir1, dir2 } => {
            let diffs = compare_dirs(dir1, dir2).context("对比分配结果失败")?;
            if diffs.is_empty() {
                return Ok("No differences".to_string());
            }
            Ok(diffs.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))
        }
    }
}

/// allocate 子命令的输入文件
pub struct AllocateRequest<'a> {
    pub people: &'a Path,
    pub committees: &'a Path,
    pub rules: Option<&'a Path>,
    pub scenario: Option<&'a Path>,
    pub config: Option<&'a Path>,
}

/// 加载输入文件并执行分配（不写出）
pub fn run_allocation(request: &AllocateRequest<'_>) -> anyhow::Result<AllocationResult> {
    let people = load_people(request.people)
        .with_context(|| format!("导入人员失败: {}", request.people.display()))?;
    let committees = load_committees(request.committees, &people)
        .with_context(|| format!("导入委员会失败: {}", request.committees.display()))?;
    let rules = match request.rules {
        Some(path) => load_rules(path).with_context(|| format!("导入规则失败: {}", path.display()))?,
        None => {
            warn!("未指定规则文件，仅使用内置硬规则");
            Vec::new()
        }
    };
    let scenario = request
        .scenario
        .map(|path| load_scenario(path).with_context(|| format!("读取场景失败: {}", path.display())))
        .transpose()?;
    let config = match request.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    };

    let result = allocate_with_config(&people, &committees, &rules, scenario.as_ref(), &config)
        .context("分配配置错误")?;
    Ok(result)
}
