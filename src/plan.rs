//! Generated plan and dependency suggestion import.
//!
//! Plans produced by an external generator arrive as JSON documents with
//! module and task estimates in hours. Importing a plan replaces the whole
//! module tree, while dependency suggestions merge additively into the tasks
//! that already exist.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fields::{TaskCategory, TimeUnit};
use crate::project::Project;
use crate::task::{Module, Task};

/// A generated project plan. All task times are in hours.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub requirement_document: String,
    #[serde(default)]
    pub modules: Vec<PlannedModule>,
}

/// One module of a generated plan.
#[derive(Debug, Deserialize)]
pub struct PlannedModule {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<PlannedTask>,
}

/// One task of a generated plan.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTask {
    pub description: String,
    pub optimistic_time: Decimal,
    pub most_likely_time: Decimal,
    pub pessimistic_time: Decimal,
    #[serde(default)]
    pub category: Option<TaskCategory>,
}

/// Suggested predecessor lists keyed by task id.
#[derive(Debug, Deserialize)]
pub struct DependencySuggestions {
    #[serde(default)]
    pub suggestions: Vec<DependencySuggestion>,
}

/// Suggested predecessors for one task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySuggestion {
    pub task_id: String,
    #[serde(default)]
    pub predecessor_task_ids: Vec<String>,
}

/// Replace the project's requirements document and modules with a plan.
///
/// Every imported task gets a fresh id, starts pending and has its weighted
/// average computed from the plan's hour estimates. Returns the module and
/// task counts of the new tree.
pub fn apply_plan(project: &mut Project, plan: GeneratedPlan) -> (usize, usize) {
    project.requirements_document = plan.requirement_document;
    project.modules = plan
        .modules
        .into_iter()
        .map(|planned| {
            let mut module = Module::new(&planned.name);
            module.tasks = planned
                .tasks
                .into_iter()
                .map(|task| {
                    Task::new(
                        &task.description,
                        task.optimistic_time,
                        task.most_likely_time,
                        task.pessimistic_time,
                        TimeUnit::Hours,
                        task.category,
                    )
                })
                .collect();
            module
        })
        .collect();
    let module_count = project.modules.len();
    let task_count = project.all_tasks().count();
    (module_count, task_count)
}

/// Merge suggested predecessors into their tasks.
///
/// Suggestions for unknown task ids are skipped, self references dropped and
/// entries already present kept once. Returns how many tasks gained at least
/// one predecessor.
pub fn apply_suggestions(project: &mut Project, suggestions: DependencySuggestions) -> usize {
    let mut changed = 0;
    for suggestion in suggestions.suggestions {
        let task = match project.find_task_mut(&suggestion.task_id) {
            Some(task) => task,
            None => continue,
        };
        let before = task.predecessor_task_ids.len();
        for pred in suggestion.predecessor_task_ids {
            if pred == task.id {
                continue;
            }
            if !task.predecessor_task_ids.contains(&pred) {
                task.predecessor_task_ids.push(pred);
            }
        }
        if task.predecessor_task_ids.len() > before {
            changed += 1;
        }
    }
    changed
}
