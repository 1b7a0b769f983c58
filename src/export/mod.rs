// ==========================================
// 委员会席位分配系统 - 导出层
// ==========================================
// 职责: AllocationResult → 输出目录（YAML 或 CSV），以及输出目录对比
// 红线: 只做格式化，不做分配决策
// ==========================================

pub mod compare;
pub mod csv_export;
pub mod document;
pub mod error;
pub mod yaml_export;

pub use compare::{compare_allocations, compare_dirs, load_allocation, CommitteeDiff};
pub use csv_export::export_csv;
pub use document::{AllocationDocument, RationaleDocument};
pub use error::{ExportError, ExportResult};
pub use yaml_export::export_yaml;

use crate::engine::orchestrator::AllocationResult;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ALLOCATION_YAML: &str = "allocation.yaml";
pub const RATIONALE_YAML: &str = "rationale.yaml";
pub const ALLOCATION_CSV: &str = "allocation.csv";
pub const RATIONALE_CSV: &str = "rationale.csv";

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Yaml,
    Csv,
}

/// 实际写出的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub allocation: PathBuf,
    pub rationale: PathBuf,
}

/// 写出分配结果到目录（目录不存在则创建）
pub fn export_result(result: &AllocationResult, output_dir: &Path, format: ExportFormat) -> ExportResult<ExportPaths> {
    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::CreateDir {
        path: output_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let paths = match format {
        ExportFormat::Yaml => {
            let paths = ExportPaths {
                allocation: output_dir.join(ALLOCATION_YAML),
                rationale: output_dir.join(RATIONALE_YAML),
            };
            export_yaml(result, &paths.allocation, &paths.rationale)?;
            paths
        }
        ExportFormat::Csv => {
            let paths = ExportPaths {
                allocation: output_dir.join(ALLOCATION_CSV),
                rationale: output_dir.join(RATIONALE_CSV),
            };
            export_csv(result, &paths.allocation, &paths.rationale)?;
            paths
        }
    };

    info!(
        allocation = %paths.allocation.display(),
        rationale = %paths.rationale.display(),
        "分配结果已导出"
    );
    Ok(paths)
}
