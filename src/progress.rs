//! Task status roll-ups.
//!
//! Progress reporting counts tasks per status and attributes their weighted
//! minutes to the matching bucket, overall and per module. Completion is the
//! share of completed tasks, rounded to a whole percent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::fields::TaskStatus;
use crate::task::{Module, Task};

/// Task counts and weighted minutes per status bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub total_tasks: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub pending_time: Decimal,
    pub in_progress_time: Decimal,
    pub completed_time: Decimal,
}

impl StatusBreakdown {
    fn add(&mut self, task: &Task) {
        self.total_tasks += 1;
        let minutes = task.weighted_average_time_in_minutes;
        match task.status {
            TaskStatus::Pending => {
                self.pending += 1;
                self.pending_time += minutes;
            }
            TaskStatus::InProgress => {
                self.in_progress += 1;
                self.in_progress_time += minutes;
            }
            TaskStatus::Completed => {
                self.completed += 1;
                self.completed_time += minutes;
            }
        }
    }

    /// Completed share of all tasks as a whole percentage, zero when empty.
    pub fn completion_percentage(&self) -> u32 {
        if self.total_tasks == 0 {
            return 0;
        }
        let percent = Decimal::from(self.completed * 100) / Decimal::from(self.total_tasks);
        percent
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }
}

/// Status breakdown for one module.
#[derive(Debug, Clone)]
pub struct ModuleProgress {
    pub module_id: String,
    pub module_name: String,
    pub breakdown: StatusBreakdown,
}

/// Project-wide progress with per-module detail.
#[derive(Debug, Clone, Default)]
pub struct ProgressReport {
    pub overall: StatusBreakdown,
    pub modules: Vec<ModuleProgress>,
}

/// Build the progress report for all modules.
pub fn report(modules: &[Module]) -> ProgressReport {
    let mut overall = StatusBreakdown::default();
    let mut per_module = Vec::with_capacity(modules.len());
    for module in modules {
        let mut breakdown = StatusBreakdown::default();
        for task in &module.tasks {
            overall.add(task);
            breakdown.add(task);
        }
        per_module.push(ModuleProgress {
            module_id: module.id.clone(),
            module_name: module.name.clone(),
            breakdown,
        });
    }
    ProgressReport {
        overall,
        modules: per_module,
    }
}

/// Next status in the pending -> in-progress -> completed cycle.
pub fn next_status(status: TaskStatus) -> TaskStatus {
    match status {
        TaskStatus::Pending => TaskStatus::InProgress,
        TaskStatus::InProgress => TaskStatus::Completed,
        TaskStatus::Completed => TaskStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TimeUnit;
    use rust_decimal_macros::dec;

    fn task_with_status(minutes: i64, status: TaskStatus) -> Task {
        let mut task = Task::new(
            "task",
            Decimal::from(minutes),
            Decimal::from(minutes),
            Decimal::from(minutes),
            TimeUnit::Minutes,
            None,
        );
        task.status = status;
        task
    }

    #[test]
    fn test_empty_report() {
        let progress = report(&[]);
        assert_eq!(progress.overall.total_tasks, 0);
        assert_eq!(progress.overall.completion_percentage(), 0);
        assert!(progress.modules.is_empty());
    }

    #[test]
    fn test_counts_times_and_percentage() {
        let mut module = Module::new("core");
        module.tasks.push(task_with_status(60, TaskStatus::Pending));
        module.tasks.push(task_with_status(120, TaskStatus::InProgress));
        module.tasks.push(task_with_status(240, TaskStatus::Completed));
        let progress = report(&[module]);
        let overall = &progress.overall;
        assert_eq!(overall.total_tasks, 3);
        assert_eq!(overall.pending, 1);
        assert_eq!(overall.in_progress, 1);
        assert_eq!(overall.completed, 1);
        assert_eq!(overall.pending_time, dec!(60));
        assert_eq!(overall.in_progress_time, dec!(120));
        assert_eq!(overall.completed_time, dec!(240));
        assert_eq!(overall.completion_percentage(), 33);
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        let mut module = Module::new("core");
        module.tasks.push(task_with_status(10, TaskStatus::Completed));
        for _ in 0..7 {
            module.tasks.push(task_with_status(10, TaskStatus::Pending));
        }
        // 1 of 8 is 12.5 percent.
        assert_eq!(report(&[module]).overall.completion_percentage(), 13);
    }

    #[test]
    fn test_per_module_breakdowns() {
        let mut first = Module::new("backend");
        first.tasks.push(task_with_status(60, TaskStatus::Completed));
        first.tasks.push(task_with_status(60, TaskStatus::Completed));
        let mut second = Module::new("frontend");
        second.tasks.push(task_with_status(30, TaskStatus::Pending));
        let progress = report(&[first, second]);
        assert_eq!(progress.modules.len(), 2);
        assert_eq!(progress.modules[0].module_name, "backend");
        assert_eq!(progress.modules[0].breakdown.completion_percentage(), 100);
        assert_eq!(progress.modules[1].breakdown.completion_percentage(), 0);
        assert_eq!(progress.overall.completion_percentage(), 67);
    }

    #[test]
    fn test_status_cycle() {
        assert_eq!(next_status(TaskStatus::Pending), TaskStatus::InProgress);
        assert_eq!(next_status(TaskStatus::InProgress), TaskStatus::Completed);
        assert_eq!(next_status(TaskStatus::Completed), TaskStatus::Pending);
    }
}
