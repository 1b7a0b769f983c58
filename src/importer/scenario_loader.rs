// ==========================================
// 委员会席位分配系统 - 场景文件读写
// ==========================================
// 格式: locks: committee -> [person], weights: rule -> float
// 红线: 文件不存在视为空场景
// ==========================================

use crate::domain::scenario::Scenario;
use crate::importer::error::{ImportError, ImportResult};
use std::path::Path;
use tracing::{debug, info};

/// 加载场景（文件不存在 → 空场景）
pub fn load_scenario(path: impl AsRef<Path>) -> ImportResult<Scenario> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "场景文件不存在，使用空场景");
        return Ok(Scenario::default());
    }

    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Scenario::default());
    }
    let scenario: Scenario = serde_yaml::from_str(&text)?;
    debug!(locks = scenario.locks.len(), weights = scenario.weights.len(), "场景已加载");
    Ok(scenario)
}

/// 保存场景（覆盖写入）
pub fn save_scenario(path: impl AsRef<Path>, scenario: &Scenario) -> ImportResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ImportError::FileWriteError(e.to_string()))?;
    }
    let text = serde_yaml::to_string(scenario)?;
    std::fs::write(path, text).map_err(|e| ImportError::FileWriteError(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), "场景已保存");
    Ok(())
}
