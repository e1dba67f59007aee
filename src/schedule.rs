//! Critical path analysis over task dependency graphs.
//!
//! Tasks schedule by their PERT weighted averages in minutes. A forward pass
//! over a topological order assigns earliest start and finish times, a
//! backward pass assigns latest times, and tasks with zero slack form the
//! critical path. Dependency ids that match no task are treated as absent
//! constraints rather than errors, so stale references never poison a plan.

use std::collections::{HashMap, HashSet, VecDeque};

use rust_decimal::Decimal;

use crate::task::{Module, Task};

/// Computed schedule for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSchedule {
    pub task_id: String,
    pub earliest_start: Decimal,
    pub earliest_finish: Decimal,
    pub latest_start: Decimal,
    pub latest_finish: Decimal,
    pub slack: Decimal,
    pub on_critical_path: bool,
}

/// Full critical path result for a project.
#[derive(Debug, Clone, Default)]
pub struct CriticalPathAnalysis {
    /// Minutes from project start to the last earliest finish.
    pub project_duration: Decimal,
    /// Per-task schedules, in module and task insertion order.
    pub tasks: Vec<TaskSchedule>,
    /// Ids of tasks with zero slack, in insertion order.
    pub critical_task_ids: Vec<String>,
}

/// Search the dependency graph for a cycle.
///
/// Returns the offending path with the closing task repeated at the end, for
/// example `["a", "b", "a"]`. Run this before trusting [`analyze`], which
/// silently leaves cycle members unscheduled.
pub fn find_cycle(modules: &[Module]) -> Option<Vec<String>> {
    let tasks: Vec<&Task> = modules.iter().flat_map(|m| m.tasks.iter()).collect();
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), *t)).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    for task in &tasks {
        if !visited.contains(task.id.as_str()) {
            if let Some(cycle) = visit(task, &by_id, &mut visited, &mut on_stack, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn visit<'a>(
    task: &'a Task,
    by_id: &HashMap<&'a str, &'a Task>,
    visited: &mut HashSet<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    on_stack.insert(task.id.as_str());
    path.push(task.id.as_str());
    for pred_id in &task.predecessor_task_ids {
        if on_stack.contains(pred_id.as_str()) {
            let start = path
                .iter()
                .position(|id| *id == pred_id.as_str())
                .unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
            cycle.push(pred_id.clone());
            return Some(cycle);
        }
        if let Some(&pred) = by_id.get(pred_id.as_str()) {
            if !visited.contains(pred_id.as_str()) {
                if let Some(cycle) = visit(pred, by_id, visited, on_stack, path) {
                    return Some(cycle);
                }
            }
        }
    }
    path.pop();
    on_stack.remove(task.id.as_str());
    visited.insert(task.id.as_str());
    None
}

/// Run the forward and backward critical path passes over all tasks.
///
/// Tasks caught in a dependency cycle never enter the topological order and
/// are omitted from the result. Everything else schedules normally.
pub fn analyze(modules: &[Module]) -> CriticalPathAnalysis {
    let tasks: Vec<&Task> = modules.iter().flat_map(|m| m.tasks.iter()).collect();
    if tasks.is_empty() {
        return CriticalPathAnalysis::default();
    }

    let index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, task) in tasks.iter().enumerate() {
        for pred_id in &task.predecessor_task_ids {
            if let Some(&p) = index.get(pred_id.as_str()) {
                preds[i].push(p);
                succs[p].push(i);
            }
        }
    }

    // Kahn's algorithm. Cycle members keep a positive in-degree forever.
    let mut in_degree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(tasks.len());
    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &s in &succs[i] {
            in_degree[s] -= 1;
            if in_degree[s] == 0 {
                queue.push_back(s);
            }
        }
    }

    let duration = |i: usize| tasks[i].weighted_average_time_in_minutes;

    // Forward pass. Every predecessor of an ordered task is ordered earlier.
    let mut scheduled = vec![false; tasks.len()];
    let mut earliest_start = vec![Decimal::ZERO; tasks.len()];
    let mut earliest_finish = vec![Decimal::ZERO; tasks.len()];
    for &i in &order {
        let start = preds[i]
            .iter()
            .map(|&p| earliest_finish[p])
            .max()
            .unwrap_or(Decimal::ZERO);
        earliest_start[i] = start;
        earliest_finish[i] = start + duration(i);
        scheduled[i] = true;
    }
    let project_duration = order
        .iter()
        .map(|&i| earliest_finish[i])
        .max()
        .unwrap_or(Decimal::ZERO);

    // Backward pass over the reversed order. Successors stuck on a cycle
    // carry no latest times and are skipped.
    let mut latest_start = vec![Decimal::ZERO; tasks.len()];
    let mut latest_finish = vec![Decimal::ZERO; tasks.len()];
    for &i in order.iter().rev() {
        let finish = succs[i]
            .iter()
            .filter(|&&s| scheduled[s])
            .map(|&s| latest_start[s])
            .min()
            .unwrap_or(project_duration);
        latest_finish[i] = finish;
        latest_start[i] = finish - duration(i);
    }

    let mut schedules = Vec::with_capacity(order.len());
    let mut critical_task_ids = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        if !scheduled[i] {
            continue;
        }
        let slack = latest_start[i] - earliest_start[i];
        let on_critical_path = slack.is_zero();
        if on_critical_path {
            critical_task_ids.push(task.id.clone());
        }
        schedules.push(TaskSchedule {
            task_id: task.id.clone(),
            earliest_start: earliest_start[i],
            earliest_finish: earliest_finish[i],
            latest_start: latest_start[i],
            latest_finish: latest_finish[i],
            slack,
            on_critical_path,
        });
    }

    CriticalPathAnalysis {
        project_duration,
        tasks: schedules,
        critical_task_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TimeUnit;
    use rust_decimal_macros::dec;

    fn make_task(id: &str, minutes: i64, preds: &[&str]) -> Task {
        // Equal estimates make the weighted average exactly `minutes`.
        let mut task = Task::new(
            id,
            Decimal::from(minutes),
            Decimal::from(minutes),
            Decimal::from(minutes),
            TimeUnit::Minutes,
            None,
        );
        task.id = id.to_string();
        task.predecessor_task_ids = preds.iter().map(|p| p.to_string()).collect();
        task
    }

    fn make_module(name: &str, tasks: Vec<Task>) -> Module {
        let mut module = Module::new(name);
        module.tasks = tasks;
        module
    }

    fn schedule_of<'a>(analysis: &'a CriticalPathAnalysis, id: &str) -> &'a TaskSchedule {
        analysis
            .tasks
            .iter()
            .find(|s| s.task_id == id)
            .unwrap_or_else(|| panic!("no schedule for {id}"))
    }

    #[test]
    fn test_empty_project() {
        let analysis = analyze(&[]);
        assert_eq!(analysis.project_duration, Decimal::ZERO);
        assert!(analysis.tasks.is_empty());
        assert!(analysis.critical_task_ids.is_empty());
    }

    #[test]
    fn test_single_task_is_critical() {
        let module = make_module("m", vec![make_task("a", 60, &[])]);
        let analysis = analyze(&[module]);
        assert_eq!(analysis.project_duration, dec!(60));
        let a = schedule_of(&analysis, "a");
        assert_eq!(a.earliest_start, Decimal::ZERO);
        assert_eq!(a.earliest_finish, dec!(60));
        assert_eq!(a.latest_start, Decimal::ZERO);
        assert_eq!(a.slack, Decimal::ZERO);
        assert!(a.on_critical_path);
    }

    #[test]
    fn test_chain_schedules_sequentially() {
        let module = make_module(
            "m",
            vec![
                make_task("a", 60, &[]),
                make_task("b", 90, &["a"]),
                make_task("c", 30, &["b"]),
            ],
        );
        let analysis = analyze(&[module]);
        assert_eq!(analysis.project_duration, dec!(180));
        let b = schedule_of(&analysis, "b");
        assert_eq!(b.earliest_start, dec!(60));
        assert_eq!(b.earliest_finish, dec!(150));
        assert_eq!(analysis.critical_task_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parallel_task_has_slack() {
        let module = make_module(
            "m",
            vec![
                make_task("a", 60, &[]),
                make_task("b", 90, &["a"]),
                make_task("c", 30, &["b"]),
                make_task("d", 20, &[]),
            ],
        );
        let analysis = analyze(&[module]);
        assert_eq!(analysis.project_duration, dec!(180));
        let d = schedule_of(&analysis, "d");
        assert_eq!(d.slack, dec!(160));
        assert!(!d.on_critical_path);
        assert_eq!(analysis.critical_task_ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_takes_longest_branch() {
        let module = make_module(
            "m",
            vec![
                make_task("a", 10, &[]),
                make_task("b", 20, &["a"]),
                make_task("c", 40, &["a"]),
                make_task("d", 10, &["b", "c"]),
            ],
        );
        let analysis = analyze(&[module]);
        assert_eq!(analysis.project_duration, dec!(60));
        let b = schedule_of(&analysis, "b");
        assert_eq!(b.slack, dec!(20));
        assert!(!b.on_critical_path);
        assert_eq!(analysis.critical_task_ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_dangling_predecessor_is_ignored() {
        let module = make_module("m", vec![make_task("a", 45, &["ghost"])]);
        let analysis = analyze(&[module]);
        assert_eq!(analysis.project_duration, dec!(45));
        let a = schedule_of(&analysis, "a");
        assert_eq!(a.earliest_start, Decimal::ZERO);
        assert!(a.on_critical_path);
    }

    #[test]
    fn test_cycle_members_are_omitted() {
        let module = make_module(
            "m",
            vec![
                make_task("x", 10, &["y"]),
                make_task("y", 10, &["x"]),
                make_task("z", 30, &[]),
            ],
        );
        let analysis = analyze(&[module]);
        assert_eq!(analysis.tasks.len(), 1);
        assert_eq!(analysis.tasks[0].task_id, "z");
        assert_eq!(analysis.project_duration, dec!(30));
        assert_eq!(analysis.critical_task_ids, vec!["z"]);
    }

    #[test]
    fn test_insertion_order_survives_dependencies() {
        let first = make_module("m1", vec![make_task("late", 10, &["early"])]);
        let second = make_module("m2", vec![make_task("early", 10, &[])]);
        let analysis = analyze(&[first, second]);
        let ids: Vec<&str> = analysis.tasks.iter().map(|s| s.task_id.as_str()).collect();
        assert_eq!(ids, vec!["late", "early"]);
    }

    #[test]
    fn test_find_cycle_reports_path() {
        let module = make_module(
            "m",
            vec![make_task("x", 10, &["y"]), make_task("y", 10, &["x"])],
        );
        let cycle = find_cycle(&[module]).expect("cycle expected");
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.first(), cycle.last());
        assert!(cycle.contains(&"x".to_string()));
        assert!(cycle.contains(&"y".to_string()));
    }

    #[test]
    fn test_find_cycle_self_dependency() {
        let module = make_module("m", vec![make_task("a", 10, &["a"])]);
        let cycle = find_cycle(&[module]).expect("cycle expected");
        assert_eq!(cycle, vec!["a", "a"]);
    }

    #[test]
    fn test_find_cycle_none_on_dag() {
        let module = make_module(
            "m",
            vec![
                make_task("a", 10, &[]),
                make_task("b", 20, &["a"]),
                make_task("c", 40, &["a", "b"]),
            ],
        );
        assert_eq!(find_cycle(&[module]), None);
    }
}
