//! PERT estimation and project-level aggregation.
//!
//! The weighted average follows the classic three-point formula
//! (pessimistic + 4 * most likely + optimistic) / 6, computed in minutes.
//! Aggregation rolls task and risk minutes into project totals, scenario
//! totals and per-category shares using exact decimal arithmetic throughout.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::fields::{TaskCategory, TimeUnit};
use crate::task::{Module, Risk};
use crate::time;

/// Validation failure for a three-point estimate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error("Time estimates must not be negative")]
    NegativeEstimate,
    #[error("Pessimistic time must be >= most likely time")]
    PessimisticBelowMostLikely,
    #[error("Most likely time must be >= optimistic time")]
    MostLikelyBelowOptimistic,
}

/// PERT weighted average of a three-point estimate, in minutes.
///
/// Any negative input yields zero. Ordering between the three points is not
/// enforced here; interactive entry points reject bad ordering up front via
/// [`validate_estimates`].
pub fn weighted_average(
    optimistic: Decimal,
    most_likely: Decimal,
    pessimistic: Decimal,
    unit: TimeUnit,
) -> Decimal {
    if optimistic < Decimal::ZERO || most_likely < Decimal::ZERO || pessimistic < Decimal::ZERO {
        return Decimal::ZERO;
    }
    let o = time::to_minutes(optimistic, unit);
    let m = time::to_minutes(most_likely, unit);
    let p = time::to_minutes(pessimistic, unit);
    (p + m * Decimal::from(4) + o) / Decimal::from(6)
}

/// Reject estimates that are negative or break optimistic <= most likely <= pessimistic.
pub fn validate_estimates(
    optimistic: Decimal,
    most_likely: Decimal,
    pessimistic: Decimal,
) -> Result<(), EstimateError> {
    if optimistic < Decimal::ZERO || most_likely < Decimal::ZERO || pessimistic < Decimal::ZERO {
        return Err(EstimateError::NegativeEstimate);
    }
    if pessimistic < most_likely {
        return Err(EstimateError::PessimisticBelowMostLikely);
    }
    if most_likely < optimistic {
        return Err(EstimateError::MostLikelyBelowOptimistic);
    }
    Ok(())
}

/// Project-wide time and cost roll-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTotals {
    /// Sum of task weighted averages, in minutes.
    pub tasks_time: Decimal,
    /// Sum of risk time reserves, in minutes.
    pub risk_time: Decimal,
    /// Task time plus risk time, before the effort multiplier.
    pub base_time: Decimal,
    /// Base time scaled by the effort multiplier.
    pub adjusted_time: Decimal,
    /// Monetary cost of the adjusted time plus fixed costs.
    pub cost: Decimal,
}

impl ProjectTotals {
    /// Roll tasks and risks up into project totals.
    ///
    /// The hourly rate applies to adjusted time converted to hours. A rate of
    /// zero or less drops the time-based term, leaving only fixed costs.
    pub fn compute(
        modules: &[Module],
        risks: &[Risk],
        effort_multiplier: Decimal,
        hourly_rate: Decimal,
        fixed_costs: Decimal,
    ) -> Self {
        let tasks_time: Decimal = modules
            .iter()
            .flat_map(|m| m.tasks.iter())
            .map(|t| t.weighted_average_time_in_minutes)
            .sum();
        let risk_time: Decimal = risks.iter().map(|r| r.risk_time_in_minutes).sum();
        let base_time = tasks_time + risk_time;
        let adjusted_time = base_time * effort_multiplier;
        let hourly = if hourly_rate > Decimal::ZERO {
            adjusted_time / Decimal::from(time::MINUTES_PER_HOUR) * hourly_rate
        } else {
            Decimal::ZERO
        };
        ProjectTotals {
            tasks_time,
            risk_time,
            base_time,
            adjusted_time,
            cost: hourly + fixed_costs,
        }
    }
}

/// Best, expected and worst case minute totals for a whole project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioTotals {
    pub optimistic: Decimal,
    pub realistic: Decimal,
    pub pessimistic: Decimal,
}

impl ScenarioTotals {
    /// Compute scenario totals across all modules.
    ///
    /// Risk reserves pad the realistic and pessimistic scenarios but not the
    /// optimistic one, and the effort multiplier scales all three.
    pub fn compute(modules: &[Module], risks: &[Risk], effort_multiplier: Decimal) -> Self {
        let mut optimistic = Decimal::ZERO;
        let mut weighted = Decimal::ZERO;
        let mut pessimistic = Decimal::ZERO;
        for task in modules.iter().flat_map(|m| m.tasks.iter()) {
            optimistic += time::to_minutes(task.optimistic_time, task.time_unit);
            weighted += task.weighted_average_time_in_minutes;
            pessimistic += time::to_minutes(task.pessimistic_time, task.time_unit);
        }
        let risk_time: Decimal = risks.iter().map(|r| r.risk_time_in_minutes).sum();
        ScenarioTotals {
            optimistic: optimistic * effort_multiplier,
            realistic: (weighted + risk_time) * effort_multiplier,
            pessimistic: (pessimistic + risk_time) * effort_multiplier,
        }
    }
}

/// Raw scenario minutes for one module, before risks and the effort multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBreakdown {
    pub module_id: String,
    pub module_name: String,
    pub optimistic: Decimal,
    pub realistic: Decimal,
    pub pessimistic: Decimal,
}

/// Per-module scenario breakdown, in module order.
pub fn module_breakdown(modules: &[Module]) -> Vec<ModuleBreakdown> {
    modules
        .iter()
        .map(|module| {
            let mut optimistic = Decimal::ZERO;
            let mut realistic = Decimal::ZERO;
            let mut pessimistic = Decimal::ZERO;
            for task in &module.tasks {
                optimistic += time::to_minutes(task.optimistic_time, task.time_unit);
                realistic += task.weighted_average_time_in_minutes;
                pessimistic += time::to_minutes(task.pessimistic_time, task.time_unit);
            }
            ModuleBreakdown {
                module_id: module.id.clone(),
                module_name: module.name.clone(),
                optimistic,
                realistic,
                pessimistic,
            }
        })
        .collect()
}

/// Weighted minutes attributed to one category. `None` is the uncategorised bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShare {
    pub category: Option<TaskCategory>,
    pub total_minutes: Decimal,
}

/// Weighted minutes per category, largest share first. Empty shares are dropped.
pub fn category_distribution(modules: &[Module]) -> Vec<CategoryShare> {
    let mut shares: Vec<CategoryShare> = Vec::new();
    for task in modules.iter().flat_map(|m| m.tasks.iter()) {
        match shares.iter_mut().find(|s| s.category == task.category) {
            Some(share) => share.total_minutes += task.weighted_average_time_in_minutes,
            None => shares.push(CategoryShare {
                category: task.category,
                total_minutes: task.weighted_average_time_in_minutes,
            }),
        }
    }
    shares.retain(|s| s.total_minutes > Decimal::ZERO);
    shares.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::RiskLevel;
    use crate::task::Task;
    use rust_decimal_macros::dec;

    fn task_hours(optimistic: Decimal, most_likely: Decimal, pessimistic: Decimal) -> Task {
        Task::new("task", optimistic, most_likely, pessimistic, TimeUnit::Hours, None)
    }

    #[test]
    fn test_weighted_average_in_hours() {
        // (600 + 4 * 360 + 240) / 6 = 380 minutes.
        let avg = weighted_average(dec!(4), dec!(6), dec!(10), TimeUnit::Hours);
        assert_eq!(avg, dec!(380));
    }

    #[test]
    fn test_weighted_average_in_minutes() {
        let avg = weighted_average(dec!(10), dec!(20), dec!(30), TimeUnit::Minutes);
        assert_eq!(avg, dec!(20));
    }

    #[test]
    fn test_weighted_average_negative_input_is_zero() {
        assert_eq!(
            weighted_average(dec!(-1), dec!(2), dec!(3), TimeUnit::Hours),
            Decimal::ZERO
        );
        assert_eq!(
            weighted_average(dec!(1), dec!(2), dec!(-3), TimeUnit::Days),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_validate_estimates_ordering() {
        assert_eq!(validate_estimates(dec!(1), dec!(2), dec!(3)), Ok(()));
        assert_eq!(validate_estimates(dec!(2), dec!(2), dec!(2)), Ok(()));
        assert_eq!(
            validate_estimates(dec!(1), dec!(3), dec!(2)),
            Err(EstimateError::PessimisticBelowMostLikely)
        );
        assert_eq!(
            validate_estimates(dec!(3), dec!(2), dec!(4)),
            Err(EstimateError::MostLikelyBelowOptimistic)
        );
        assert_eq!(
            validate_estimates(dec!(-1), dec!(2), dec!(3)),
            Err(EstimateError::NegativeEstimate)
        );
    }

    #[test]
    fn test_totals_quarter_minute_sum_is_exact() {
        let mut module = Module::new("bulk");
        for _ in 0..10_000 {
            module.tasks.push(Task::new(
                "sliver",
                dec!(0.25),
                dec!(0.25),
                dec!(0.25),
                TimeUnit::Minutes,
                None,
            ));
        }
        let totals =
            ProjectTotals::compute(&[module], &[], Decimal::ONE, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals.tasks_time, dec!(2500));
        assert_eq!(totals.base_time, dec!(2500));
        assert_eq!(totals.adjusted_time, dec!(2500));
    }

    #[test]
    fn test_totals_are_deterministic() {
        let mut module = Module::new("core");
        module.tasks.push(task_hours(dec!(1.1), dec!(2.3), dec!(4.7)));
        module.tasks.push(task_hours(dec!(0.25), dec!(0.5), dec!(1)));
        let modules = [module];
        let first = ProjectTotals::compute(&modules, &[], dec!(1.3), dec!(85), dec!(12.5));
        let second = ProjectTotals::compute(&modules, &[], dec!(1.3), dec!(85), dec!(12.5));
        assert_eq!(first, second);
    }

    #[test]
    fn test_totals_cost_from_rate_and_fixed_costs() {
        let mut module = Module::new("core");
        // Weighted average is exactly 600 minutes.
        module.tasks.push(task_hours(dec!(10), dec!(10), dec!(10)));
        let totals =
            ProjectTotals::compute(&[module], &[], Decimal::ONE, dec!(50), dec!(100));
        assert_eq!(totals.adjusted_time, dec!(600));
        assert_eq!(totals.cost, dec!(600));
    }

    #[test]
    fn test_totals_zero_rate_keeps_fixed_costs() {
        let mut module = Module::new("core");
        module.tasks.push(task_hours(dec!(1), dec!(1), dec!(1)));
        let totals =
            ProjectTotals::compute(&[module], &[], Decimal::ONE, Decimal::ZERO, dec!(250));
        assert_eq!(totals.cost, dec!(250));
    }

    #[test]
    fn test_totals_risk_and_multiplier() {
        let mut module = Module::new("core");
        module.tasks.push(task_hours(dec!(1), dec!(2), dec!(3)));
        let risk = Risk::new(
            "integration slips",
            dec!(1),
            TimeUnit::Hours,
            RiskLevel::Medium,
            RiskLevel::High,
        );
        let totals =
            ProjectTotals::compute(&[module], &[risk], dec!(1.5), Decimal::ZERO, Decimal::ZERO);
        // Weighted is 120, risk is 60, so base 180 and adjusted 270.
        assert_eq!(totals.tasks_time, dec!(120));
        assert_eq!(totals.risk_time, dec!(60));
        assert_eq!(totals.base_time, dec!(180));
        assert_eq!(totals.adjusted_time, dec!(270));
    }

    #[test]
    fn test_scenarios_risk_skips_optimistic() {
        let mut module = Module::new("core");
        module.tasks.push(task_hours(dec!(1), dec!(2), dec!(3)));
        module.tasks.push(task_hours(dec!(2), dec!(4), dec!(6)));
        let risk = Risk::new(
            "late vendor API",
            dec!(60),
            TimeUnit::Minutes,
            RiskLevel::Low,
            RiskLevel::Low,
        );
        let totals = ScenarioTotals::compute(&[module], &[risk], dec!(1.2));
        assert_eq!(totals.optimistic, dec!(216.0));
        assert_eq!(totals.realistic, dec!(504.0));
        assert_eq!(totals.pessimistic, dec!(720.0));
    }

    #[test]
    fn test_module_breakdown_is_raw() {
        let mut first = Module::new("backend");
        first.tasks.push(task_hours(dec!(1), dec!(2), dec!(3)));
        let mut second = Module::new("frontend");
        second.tasks.push(task_hours(dec!(2), dec!(4), dec!(6)));
        let rows = module_breakdown(&[first, second]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].module_name, "backend");
        assert_eq!(rows[0].optimistic, dec!(60));
        assert_eq!(rows[0].realistic, dec!(120));
        assert_eq!(rows[0].pessimistic, dec!(180));
        assert_eq!(rows[1].module_name, "frontend");
        assert_eq!(rows[1].realistic, dec!(240));
    }

    #[test]
    fn test_category_distribution_sorted_and_filtered() {
        let mut module = Module::new("core");
        let mut design = task_hours(dec!(1), dec!(1), dec!(1));
        design.category = Some(TaskCategory::Design);
        let mut backend = task_hours(dec!(4), dec!(4), dec!(4));
        backend.category = Some(TaskCategory::DevelopmentBackend);
        let uncategorised = task_hours(dec!(2), dec!(2), dec!(2));
        let empty = Task::new(
            "placeholder",
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            TimeUnit::Minutes,
            Some(TaskCategory::TestingQa),
        );
        module.tasks.extend([design, backend, uncategorised, empty]);

        let shares = category_distribution(&[module]);
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].category, Some(TaskCategory::DevelopmentBackend));
        assert_eq!(shares[0].total_minutes, dec!(240));
        assert_eq!(shares[1].category, None);
        assert_eq!(shares[1].total_minutes, dec!(120));
        assert_eq!(shares[2].category, Some(TaskCategory::Design));
        assert_eq!(shares[2].total_minutes, dec!(60));
    }
}
