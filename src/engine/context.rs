// ==========================================
// 委员会席位分配系统 - 分配上下文
// ==========================================
// 职责: 聚合单次运行的只读输入（人员、委员会、已编译规则）
// 红线: 运行期间只读; 人员/委员会均按 ID 升序
// ==========================================

use crate::domain::allocation::Assignment;
use crate::domain::committee::Committee;
use crate::domain::person::Person;
use crate::engine::rule_engine::RuleSet;
use std::collections::BTreeMap;

pub struct AllocationContext<'a> {
    people: Vec<&'a Person>,
    people_by_id: BTreeMap<&'a str, &'a Person>,
    committees: Vec<&'a Committee>,
    rules: &'a RuleSet,
}

impl<'a> AllocationContext<'a> {
    pub fn new(people: &'a [Person], committees: &'a [Committee], rules: &'a RuleSet) -> Self {
        let mut people: Vec<&Person> = people.iter().collect();
        people.sort_by(|a, b| a.id.cmp(&b.id));
        let people_by_id = people.iter().map(|p| (p.id.as_str(), *p)).collect();

        let mut committees: Vec<&Committee> = committees.iter().collect();
        committees.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            people,
            people_by_id,
            committees,
            rules,
        }
    }

    /// 全部人员（ID 升序）
    pub fn people(&self) -> &[&'a Person] {
        &self.people
    }

    /// 全部委员会（ID 升序）
    pub fn committees(&self) -> &[&'a Committee] {
        &self.committees
    }

    pub fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    pub fn person(&self, id: &str) -> Option<&'a Person> {
        self.people_by_id.get(id).copied()
    }

    pub fn committee(&self, id: &str) -> Option<&'a Committee> {
        self.committees
            .binary_search_by(|c| c.id.as_str().cmp(id))
            .ok()
            .map(|idx| self.committees[idx])
    }

    /// 委员会当前成员（排除 candidate_id 本人）
    pub fn peers(&self, committee_id: &str, assignment: &Assignment, candidate_id: &str) -> Vec<&'a Person> {
        assignment
            .members(committee_id)
            .filter(|id| *id != candidate_id)
            .filter_map(|id| self.person(id))
            .collect()
    }

    /// 委员会当前成员
    pub fn members(&self, committee_id: &str, assignment: &Assignment) -> Vec<&'a Person> {
        assignment
            .members(committee_id)
            .filter_map(|id| self.person(id))
            .collect()
    }
}
