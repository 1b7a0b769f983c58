// ==========================================
// 委员会席位分配系统 - YAML 导出
// ==========================================
// 输出: allocation.yaml + rationale.yaml（键有序，结果可复现）
// ==========================================

use crate::engine::orchestrator::AllocationResult;
use crate::export::document::{AllocationDocument, RationaleDocument};
use crate::export::error::{ExportError, ExportResult};
use serde::Serialize;
use std::path::Path;

/// 写出 YAML 分配与说明文件
pub fn export_yaml(result: &AllocationResult, allocation_file: &Path, rationale_file: &Path) -> ExportResult<()> {
    write_document(allocation_file, &AllocationDocument::from(result))?;
    write_document(rationale_file, &RationaleDocument::from(result))?;
    Ok(())
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> ExportResult<()> {
    let text = serde_yaml::to_string(document)?;
    std::fs::write(path, text).map_err(|e| ExportError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
