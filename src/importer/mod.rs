// ==========================================
// 委员会席位分配系统 - 导入层
// ==========================================
// 职责: 外部文件 → 领域对象（人员、委员会、规则、场景）
// 支持: CSV（人员/委员会）, YAML（规则/场景）
// 红线: 只做格式与引用校验，不做分配决策
// ==========================================

pub mod committee_loader;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod people_loader;
pub mod rule_loader;
pub mod scenario_loader;

// 重导出核心类型
pub use committee_loader::load_committees;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldReader;
pub use file_parser::{CsvParser, RawRecord};
pub use people_loader::load_people;
pub use rule_loader::{load_rules, parse_rules};
pub use scenario_loader::{load_scenario, save_scenario};
