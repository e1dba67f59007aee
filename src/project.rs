//! Project record and derived totals.
//!
//! A project bundles estimation modules, risks and costing settings together
//! with cached roll-up totals. The cached fields are refreshed through
//! [`Project::recompute`] on every mutation, so a saved file always carries
//! totals consistent with its tasks and risks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimate::ProjectTotals;
use crate::task::{Module, Risk, Task};

fn default_effort_multiplier() -> Decimal {
    Decimal::ONE
}

fn default_hourly_rate() -> Decimal {
    Decimal::from(50)
}

/// An estimation project with modules, risks and costing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub requirements_document: String,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default = "default_effort_multiplier")]
    pub effort_multiplier: Decimal,
    #[serde(default = "default_hourly_rate")]
    pub hourly_rate: Decimal,
    #[serde(default)]
    pub fixed_costs: Decimal,
    #[serde(default)]
    pub total_base_time_in_minutes: Decimal,
    #[serde(default)]
    pub total_adjusted_time_in_minutes: Decimal,
    #[serde(default)]
    pub total_project_cost: Decimal,
}

impl Project {
    /// Create an empty project with default costing settings.
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            requirements_document: String::new(),
            modules: Vec::new(),
            risks: Vec::new(),
            effort_multiplier: default_effort_multiplier(),
            hourly_rate: default_hourly_rate(),
            fixed_costs: Decimal::ZERO,
            total_base_time_in_minutes: Decimal::ZERO,
            total_adjusted_time_in_minutes: Decimal::ZERO,
            total_project_cost: Decimal::ZERO,
        }
    }

    /// Mark the project as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Refresh every derived field and return the full roll-up.
    ///
    /// Task weighted averages and risk reserves are recomputed from their raw
    /// estimates first, so edits to any input flow through to the totals.
    pub fn recompute(&mut self) -> ProjectTotals {
        for module in &mut self.modules {
            for task in &mut module.tasks {
                task.recompute();
            }
        }
        for risk in &mut self.risks {
            risk.recompute();
        }
        let totals = ProjectTotals::compute(
            &self.modules,
            &self.risks,
            self.effort_multiplier,
            self.hourly_rate,
            self.fixed_costs,
        );
        self.total_base_time_in_minutes = totals.base_time.normalize();
        self.total_adjusted_time_in_minutes = totals.adjusted_time.normalize();
        self.total_project_cost = totals.cost.normalize();
        totals
    }

    /// Iterate over every task across all modules.
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.modules.iter().flat_map(|m| m.tasks.iter())
    }

    /// Look up a task by exact id.
    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.all_tasks().find(|t| t.id == id)
    }

    /// Look up a task by exact id, mutably.
    pub fn find_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.modules
            .iter_mut()
            .flat_map(|m| m.tasks.iter_mut())
            .find(|t| t.id == id)
    }

    /// Look up a module by exact id, mutably.
    pub fn find_module_mut(&mut self, id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.id == id)
    }

    /// Resolve a module identifier to its id.
    ///
    /// Accepts an exact id, a unique id prefix, or a case-insensitive module
    /// name. Ambiguous identifiers produce an error listing the candidates.
    pub fn resolve_module(&self, identifier: &str) -> Result<String, String> {
        if let Some(module) = self.modules.iter().find(|m| m.id == identifier) {
            return Ok(module.id.clone());
        }
        let by_prefix: Vec<&Module> = self
            .modules
            .iter()
            .filter(|m| m.id.starts_with(identifier))
            .collect();
        if by_prefix.len() == 1 {
            return Ok(by_prefix[0].id.clone());
        }
        if by_prefix.len() > 1 {
            let mut error_msg = format!("Multiple module ids start with '{}':\n", identifier);
            for module in by_prefix {
                error_msg.push_str(&format!("  {}: {}\n", module.id, module.name));
            }
            error_msg.push_str("Please use a longer prefix or the full ID.");
            return Err(error_msg);
        }
        let matches: Vec<&Module> = self
            .modules
            .iter()
            .filter(|m| m.name.to_lowercase() == identifier.to_lowercase())
            .collect();
        match matches.len() {
            0 => Err(format!("No module found matching '{}'", identifier)),
            1 => Ok(matches[0].id.clone()),
            _ => {
                let mut error_msg = format!("Multiple modules found with name '{}':\n", identifier);
                for module in matches {
                    error_msg.push_str(&format!("  {}: {}\n", module.id, module.name));
                }
                error_msg.push_str("Please use the specific ID instead.");
                Err(error_msg)
            }
        }
    }

    /// Resolve a task identifier to its id.
    ///
    /// Accepts an exact id, a unique id prefix, or a case-insensitive task
    /// description. Ambiguous identifiers produce an error listing the
    /// candidates.
    pub fn resolve_task(&self, identifier: &str) -> Result<String, String> {
        if let Some(task) = self.all_tasks().find(|t| t.id == identifier) {
            return Ok(task.id.clone());
        }
        let by_prefix: Vec<&Task> = self
            .all_tasks()
            .filter(|t| t.id.starts_with(identifier))
            .collect();
        if by_prefix.len() == 1 {
            return Ok(by_prefix[0].id.clone());
        }
        if by_prefix.len() > 1 {
            let mut error_msg = format!("Multiple task ids start with '{}':\n", identifier);
            for task in by_prefix {
                error_msg.push_str(&format!("  {}: {}\n", task.id, task.description));
            }
            error_msg.push_str("Please use a longer prefix or the full ID.");
            return Err(error_msg);
        }
        let matches: Vec<&Task> = self
            .all_tasks()
            .filter(|t| t.description.to_lowercase() == identifier.to_lowercase())
            .collect();
        match matches.len() {
            0 => Err(format!("No task found matching '{}'", identifier)),
            1 => Ok(matches[0].id.clone()),
            _ => {
                let mut error_msg = format!("Multiple tasks found matching '{}':\n", identifier);
                for task in matches {
                    error_msg.push_str(&format!("  {}: {}\n", task.id, task.description));
                }
                error_msg.push_str("Please use the specific ID instead.");
                Err(error_msg)
            }
        }
    }

    /// Resolve a risk identifier to its id.
    ///
    /// Accepts an exact id, a unique id prefix, or a case-insensitive risk
    /// description.
    pub fn resolve_risk(&self, identifier: &str) -> Result<String, String> {
        if let Some(risk) = self.risks.iter().find(|r| r.id == identifier) {
            return Ok(risk.id.clone());
        }
        let by_prefix: Vec<&Risk> = self
            .risks
            .iter()
            .filter(|r| r.id.starts_with(identifier))
            .collect();
        if by_prefix.len() == 1 {
            return Ok(by_prefix[0].id.clone());
        }
        if by_prefix.len() > 1 {
            let mut error_msg = format!("Multiple risk ids start with '{}':\n", identifier);
            for risk in by_prefix {
                error_msg.push_str(&format!("  {}: {}\n", risk.id, risk.description));
            }
            error_msg.push_str("Please use a longer prefix or the full ID.");
            return Err(error_msg);
        }
        let matches: Vec<&Risk> = self
            .risks
            .iter()
            .filter(|r| r.description.to_lowercase() == identifier.to_lowercase())
            .collect();
        match matches.len() {
            0 => Err(format!("No risk found matching '{}'", identifier)),
            1 => Ok(matches[0].id.clone()),
            _ => {
                let mut error_msg = format!("Multiple risks found matching '{}':\n", identifier);
                for risk in matches {
                    error_msg.push_str(&format!("  {}: {}\n", risk.id, risk.description));
                }
                error_msg.push_str("Please use the specific ID instead.");
                Err(error_msg)
            }
        }
    }

    /// Remove a task and clear it from every dependency list.
    ///
    /// Returns false when no task carried the id.
    pub fn remove_task(&mut self, id: &str) -> bool {
        let mut removed = false;
        for module in &mut self.modules {
            let before = module.tasks.len();
            module.tasks.retain(|t| t.id != id);
            removed |= module.tasks.len() != before;
        }
        if removed {
            self.clear_predecessors(&[id.to_string()]);
        }
        removed
    }

    /// Remove a module and clear its tasks from every dependency list.
    pub fn remove_module(&mut self, id: &str) -> Option<Module> {
        let position = self.modules.iter().position(|m| m.id == id)?;
        let module = self.modules.remove(position);
        let removed_ids: Vec<String> = module.tasks.iter().map(|t| t.id.clone()).collect();
        self.clear_predecessors(&removed_ids);
        Some(module)
    }

    fn clear_predecessors(&mut self, removed_ids: &[String]) {
        for module in &mut self.modules {
            for task in &mut module.tasks {
                task.predecessor_task_ids
                    .retain(|pred| !removed_ids.contains(pred));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{RiskLevel, TaskCategory, TimeUnit};
    use rust_decimal_macros::dec;

    fn project_with_tasks() -> Project {
        let mut project = Project::new("demo");
        let mut module = Module::new("core");
        module.tasks.push(Task::new(
            "Design schema",
            dec!(1),
            dec!(2),
            dec!(3),
            TimeUnit::Hours,
            None,
        ));
        module.tasks.push(Task::new(
            "Build API",
            dec!(2),
            dec!(4),
            dec!(6),
            TimeUnit::Hours,
            None,
        ));
        project.modules.push(module);
        project
    }

    #[test]
    fn test_recompute_updates_cached_totals() {
        let mut project = project_with_tasks();
        project.effort_multiplier = dec!(1.5);
        project.hourly_rate = dec!(60);
        project.fixed_costs = dec!(100);
        let totals = project.recompute();
        // Weighted averages are 120 and 240 minutes.
        assert_eq!(totals.base_time, dec!(360));
        assert_eq!(project.total_base_time_in_minutes, dec!(360));
        assert_eq!(project.total_adjusted_time_in_minutes, dec!(540));
        // 540 minutes is 9 hours at 60/h, plus 100 fixed.
        assert_eq!(project.total_project_cost, dec!(640));
    }

    #[test]
    fn test_parses_files_from_earlier_versions() {
        let raw = r#"{
            "id": "p1", "name": "legacy",
            "createdAt": "2024-05-01T10:00:00Z", "updatedAt": "2024-05-02T10:00:00Z",
            "requirementsDocument": "notes",
            "modules": [{"id": "m1", "name": "Core", "tasks": [{
                "id": "t1", "description": "Build",
                "optimisticTime": 1, "mostLikelyTime": "2", "pessimisticTime": 3,
                "timeUnit": "Hours", "category": "Testing/QA", "status": "Pending",
                "weightedAverageTimeInMinutes": "0"}]}],
            "risks": [{"id": "r1", "description": "slip", "timeEstimate": 2,
                "timeUnit": "Hours", "riskTimeInMinutes": "0",
                "probability": "High", "impactSeverity": "Medium"}],
            "effortMultiplier": "1.5", "hourlyRate": 60, "fixedCosts": "0",
            "totalBaseTimeInMinutes": "0", "totalAdjustedTimeInMinutes": "0",
            "totalProjectCost": "0"
        }"#;
        let mut project: Project = serde_json::from_str(raw).expect("legacy file parses");
        assert_eq!(project.modules[0].tasks[0].category, Some(TaskCategory::TestingQa));
        assert_eq!(project.risks[0].probability, RiskLevel::High);
        let totals = project.recompute();
        // 1/2/3 hours weigh to 120; the risk reserves 120 more.
        assert_eq!(project.total_base_time_in_minutes, dec!(240));
        assert_eq!(project.total_adjusted_time_in_minutes, dec!(360));
        assert_eq!(totals.cost, dec!(360));
    }

    #[test]
    fn test_resolve_task_by_name_and_prefix() {
        let project = project_with_tasks();
        let id = project.resolve_task("build api").expect("name match");
        assert_eq!(project.find_task(&id).map(|t| t.description.as_str()), Some("Build API"));
        let prefix = &id[..8];
        assert_eq!(project.resolve_task(prefix), Ok(id));
    }

    #[test]
    fn test_resolve_task_rejects_unknown_and_ambiguous() {
        let mut project = project_with_tasks();
        assert!(project.resolve_task("nope").is_err());
        let duplicate = Task::new(
            "Build API",
            dec!(1),
            dec!(1),
            dec!(1),
            TimeUnit::Hours,
            None,
        );
        project.modules[0].tasks.push(duplicate);
        let err = project.resolve_task("Build API").unwrap_err();
        assert!(err.contains("Multiple tasks"));
        assert!(err.contains("Please use the specific ID instead."));
    }

    #[test]
    fn test_remove_task_clears_dependencies() {
        let mut project = project_with_tasks();
        let first = project.modules[0].tasks[0].id.clone();
        let second = project.modules[0].tasks[1].id.clone();
        project.modules[0].tasks[1]
            .predecessor_task_ids
            .push(first.clone());
        assert!(project.remove_task(&first));
        let survivor = project.find_task(&second).expect("second task");
        assert!(survivor.predecessor_task_ids.is_empty());
        assert!(!project.remove_task(&first));
    }

    #[test]
    fn test_remove_module_clears_dependencies() {
        let mut project = project_with_tasks();
        let mut extra = Module::new("extra");
        extra.tasks.push(Task::new(
            "Ship it",
            dec!(1),
            dec!(1),
            dec!(1),
            TimeUnit::Hours,
            None,
        ));
        let shipped = extra.tasks[0].id.clone();
        let core_task = project.modules[0].tasks[0].id.clone();
        extra.tasks[0].predecessor_task_ids.push(core_task);
        project.modules.push(extra);
        let core_id = project.modules[0].id.clone();
        let removed = project.remove_module(&core_id).expect("module removed");
        assert_eq!(removed.name, "core");
        let survivor = project.find_task(&shipped).expect("extra task");
        assert!(survivor.predecessor_task_ids.is_empty());
    }
}
