// ==========================================
// 委员会席位分配系统 - 分配结果对比
// ==========================================
// 输入: 两个输出目录（各含 allocation.yaml）
// 输出: 每个有变化的委员会: + 新增成员 / - 移除成员
// ==========================================

use crate::export::document::AllocationDocument;
use crate::export::error::{ExportError, ExportResult};
use crate::export::ALLOCATION_YAML;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeDiff {
    pub committee: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl fmt::Display for CommitteeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.committee)?;
        if !self.added.is_empty() {
            write!(f, "\n  + {}", self.added.join("; "))?;
        }
        if !self.removed.is_empty() {
            write!(f, "\n  - {}", self.removed.join("; "))?;
        }
        Ok(())
    }
}

/// 读取目录中的 allocation.yaml
pub fn load_allocation(dir: &Path) -> ExportResult<AllocationDocument> {
    let path = dir.join(ALLOCATION_YAML);
    if !path.exists() {
        return Err(ExportError::AllocationNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(&path).map_err(|e| ExportError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(serde_yaml::from_str(&text)?)
}

/// 对比两个分配（委员会ID升序，仅列出有变化的委员会）
pub fn compare_allocations(before: &AllocationDocument, after: &AllocationDocument) -> Vec<CommitteeDiff> {
    let before = before.roster();
    let after = after.roster();
    let committees: BTreeSet<&str> = before.keys().chain(after.keys()).copied().collect();

    committees
        .into_iter()
        .filter_map(|committee| {
            let old = members_of(&before, committee);
            let new = members_of(&after, committee);
            let added: Vec<String> = new.difference(&old).map(|p| p.to_string()).collect();
            let removed: Vec<String> = old.difference(&new).map(|p| p.to_string()).collect();
            (!added.is_empty() || !removed.is_empty()).then(|| CommitteeDiff {
                committee: committee.to_string(),
                added,
                removed,
            })
        })
        .collect()
}

/// 对比两个输出目录
pub fn compare_dirs(dir1: &Path, dir2: &Path) -> ExportResult<Vec<CommitteeDiff>> {
    let before = load_allocation(dir1)?;
    let after = load_allocation(dir2)?;
    Ok(compare_allocations(&before, &after))
}

fn members_of<'a>(roster: &BTreeMap<&'a str, Vec<&'a str>>, committee: &str) -> BTreeSet<&'a str> {
    roster
        .get(committee)
        .map(|members| members.iter().copied().collect())
        .unwrap_or_default()
}
