// ==========================================
// 委员会席位分配系统 - CSV 导出
// ==========================================
// allocation.csv: committee,person,locked,score
// rationale.csv : 席位说明表 + 空行 + 委员会健康表
// ==========================================

use crate::domain::allocation::{RationaleCard, RuleResult};
use crate::engine::orchestrator::AllocationResult;
use crate::export::error::{ExportError, ExportResult};
use csv::Writer;
use std::path::Path;

const ALLOCATION_HEADER: &[&str] = &["committee", "person", "locked", "score"];
const SEAT_HEADER: &[&str] = &[
    "committee",
    "person",
    "outcome",
    "deciding_rule",
    "score",
    "locked",
    "rationale",
];
const HEALTH_HEADER: &[&str] = &[
    "committee",
    "size",
    "min_size",
    "max_size",
    "status",
    "health",
    "missing_competencies",
];

/// 写出 CSV 分配与说明文件
pub fn export_csv(result: &AllocationResult, allocation_file: &Path, rationale_file: &Path) -> ExportResult<()> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(ALLOCATION_HEADER)?;
    for report in &result.committees {
        for seat in &report.members {
            wtr.write_record([
                report.committee_id.as_str(),
                seat.person_id.as_str(),
                &seat.locked.to_string(),
                &format!("{:.2}", seat.score),
            ])?;
        }
    }
    write_file(allocation_file, into_bytes(wtr, allocation_file)?)?;

    let mut seats = Writer::from_writer(Vec::new());
    seats.write_record(SEAT_HEADER)?;
    for card in &result.cards {
        seats.write_record([
            card.committee_id.as_str(),
            card.person_id.as_str(),
            &card.outcome.to_string(),
            card.deciding_rule.as_deref().unwrap_or(""),
            &card.score.map(|s| format!("{:.2}", s)).unwrap_or_default(),
            &card.locked.to_string(),
            &rationale_text(card),
        ])?;
    }

    let mut health = Writer::from_writer(Vec::new());
    health.write_record(HEALTH_HEADER)?;
    for report in &result.committees {
        let coverage = &report.coverage;
        let missing: Vec<&str> = coverage.missing_required.keys().map(String::as_str).collect();
        health.write_record([
            report.committee_id.as_str(),
            &coverage.size.to_string(),
            &coverage.size_min.to_string(),
            &coverage.size_max.to_string(),
            &report.status.to_string(),
            &report.health.to_string(),
            &missing.join(";"),
        ])?;
    }

    let mut bytes = into_bytes(seats, rationale_file)?;
    bytes.push(b'\n');
    bytes.extend(into_bytes(health, rationale_file)?);
    write_file(rationale_file, bytes)
}

/// 说明文本: 各规则结果 + 附注，以 "; " 连接
pub fn rationale_text(card: &RationaleCard) -> String {
    card.evaluations
        .iter()
        .map(|evaluation| match &evaluation.result {
            RuleResult::Passed => format!("{}: passed", evaluation.rule),
            RuleResult::Excluded { reason } => reason.clone(),
            RuleResult::Scored { explanation, .. } => explanation.clone(),
        })
        .chain(card.notes.iter().cloned())
        .collect::<Vec<_>>()
        .join("; ")
}

fn into_bytes(wtr: Writer<Vec<u8>>, path: &Path) -> ExportResult<Vec<u8>> {
    wtr.into_inner().map_err(|e| ExportError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write_file(path: &Path, bytes: Vec<u8>) -> ExportResult<()> {
    std::fs::write(path, bytes).map_err(|e| ExportError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
