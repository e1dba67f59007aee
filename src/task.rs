//! Task, module and risk data structures.
//!
//! This module defines the core records of an estimation project: tasks with
//! PERT three-point estimates, the modules that group them, and project-level
//! risks. Field names serialise in camelCase to stay compatible with project
//! files exported by earlier versions of the tool.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimate;
use crate::fields::{RiskLevel, TaskCategory, TaskStatus, TimeUnit};
use crate::time;

/// A single work item estimated with three time points.
///
/// Tasks carry their raw optimistic, most likely and pessimistic estimates in
/// the unit they were entered in, plus the derived PERT weighted average in
/// minutes. The derived field is recomputed whenever an estimate changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub description: String,
    pub optimistic_time: Decimal,
    pub most_likely_time: Decimal,
    pub pessimistic_time: Decimal,
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub category: Option<TaskCategory>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub predecessor_task_ids: Vec<String>,
    pub weighted_average_time_in_minutes: Decimal,
}

impl Task {
    /// Create a task with a fresh id and a computed weighted average.
    pub fn new(
        description: &str,
        optimistic: Decimal,
        most_likely: Decimal,
        pessimistic: Decimal,
        unit: TimeUnit,
        category: Option<TaskCategory>,
    ) -> Self {
        let mut task = Task {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            optimistic_time: optimistic,
            most_likely_time: most_likely,
            pessimistic_time: pessimistic,
            time_unit: unit,
            category,
            status: TaskStatus::Pending,
            predecessor_task_ids: Vec::new(),
            weighted_average_time_in_minutes: Decimal::ZERO,
        };
        task.recompute();
        task
    }

    /// Refresh the derived weighted average from the raw estimates.
    pub fn recompute(&mut self) {
        self.weighted_average_time_in_minutes = estimate::weighted_average(
            self.optimistic_time,
            self.most_likely_time,
            self.pessimistic_time,
            self.time_unit,
        );
    }
}

/// A named group of tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Module {
    /// Create an empty module with a fresh id.
    pub fn new(name: &str) -> Self {
        Module {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            tasks: Vec::new(),
        }
    }
}

/// A project-level risk with a probability/impact rating and a time reserve.
///
/// Unlike tasks, risk time is a single direct estimate, not a PERT average.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: String,
    pub description: String,
    pub time_estimate: Decimal,
    pub time_unit: TimeUnit,
    pub risk_time_in_minutes: Decimal,
    pub probability: RiskLevel,
    pub impact_severity: RiskLevel,
}

impl Risk {
    /// Create a risk with a fresh id and a converted minute reserve.
    pub fn new(
        description: &str,
        time_estimate: Decimal,
        unit: TimeUnit,
        probability: RiskLevel,
        impact_severity: RiskLevel,
    ) -> Self {
        let mut risk = Risk {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            time_estimate,
            time_unit: unit,
            risk_time_in_minutes: Decimal::ZERO,
            probability,
            impact_severity,
        };
        risk.recompute();
        risk
    }

    /// Refresh the derived minute reserve from the raw estimate.
    pub fn recompute(&mut self) {
        self.risk_time_in_minutes = time::to_minutes(self.time_estimate, self.time_unit);
    }
}
