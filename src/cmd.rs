//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers that implement the various
//! subcommands available in the CLI, from project and task CRUD through the
//! analysis commands for critical path, risk scoring and progress.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::estimate::{category_distribution, module_breakdown, validate_estimates, ScenarioTotals};
use crate::fields::*;
use crate::plan::{apply_plan, apply_suggestions, DependencySuggestions, GeneratedPlan};
use crate::progress;
use crate::project::Project;
use crate::risk;
use crate::schedule;
use crate::store::*;
use crate::task::{Module, Risk, Task};
use crate::time;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project.
    New {
        /// Project name.
        name: String,
    },

    /// List all projects, most recently updated first.
    Projects,

    /// Delete a project file.
    Delete {
        /// Project name or ID to delete.
        project: String,
    },

    /// Show the project's time and cost roll-up.
    Summary,

    /// Show scenario totals with per-module and per-category breakdowns.
    Analytics,

    /// Update the project name, requirements document or costing settings.
    Set {
        /// Rename the project.
        #[arg(long)]
        name: Option<String>,
        /// Requirements document text.
        #[arg(long)]
        requirements: Option<String>,
        /// Read the requirements document from a file.
        #[arg(long)]
        requirements_file: Option<PathBuf>,
        /// Effort multiplier applied to the base time.
        #[arg(long, allow_negative_numbers = true)]
        effort_multiplier: Option<Decimal>,
        /// Hourly rate for cost estimation. Negative values clamp to zero.
        #[arg(long, allow_negative_numbers = true)]
        hourly_rate: Option<Decimal>,
        /// Fixed costs added on top of the time-based cost.
        #[arg(long, allow_negative_numbers = true)]
        fixed_costs: Option<Decimal>,
    },

    /// Manage modules.
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },

    /// Manage tasks.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage risks.
    Risk {
        #[command(subcommand)]
        action: RiskAction,
    },

    /// Manage task dependencies.
    Dep {
        #[command(subcommand)]
        action: DepAction,
    },

    /// Compute the critical path schedule.
    CriticalPath,

    /// Show task progress per status and module.
    Progress,

    /// Manage generated project plans.
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Export the project with a summary block.
    Export {
        /// Output file. Defaults to <name>-export.json.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import a project file into the PE directory.
    Import {
        /// Path to the project JSON file.
        input: PathBuf,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ModuleAction {
    /// Add a module.
    Add {
        /// Module name
        name: String,
    },
    /// Rename a module.
    Rename {
        /// Module ID or name
        module: String,
        /// New name
        name: String,
    },
    /// Remove a module and all its tasks.
    Rm {
        /// Module ID or name
        module: String,
    },
    /// List modules with task counts and times.
    List,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a module.
    Add {
        /// Module ID or name
        module: String,
        /// Task description
        description: String,
        /// Optimistic time estimate
        #[arg(allow_negative_numbers = true)]
        optimistic: Decimal,
        /// Most likely time estimate
        #[arg(allow_negative_numbers = true)]
        most_likely: Decimal,
        /// Pessimistic time estimate
        #[arg(allow_negative_numbers = true)]
        pessimistic: Decimal,
        /// Unit the estimates are in: minutes | hours | days.
        #[arg(long, value_enum, default_value_t = TimeUnit::Hours)]
        unit: TimeUnit,
        /// Work category.
        #[arg(long, value_enum)]
        category: Option<TaskCategory>,
    },
    /// Update a task's description, estimates or category.
    Update {
        /// Task ID or description
        task: String,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New optimistic time estimate.
        #[arg(long, allow_negative_numbers = true)]
        optimistic: Option<Decimal>,
        /// New most likely time estimate.
        #[arg(long, allow_negative_numbers = true)]
        most_likely: Option<Decimal>,
        /// New pessimistic time estimate.
        #[arg(long, allow_negative_numbers = true)]
        pessimistic: Option<Decimal>,
        /// New unit for the estimates.
        #[arg(long, value_enum)]
        unit: Option<TimeUnit>,
        /// New work category.
        #[arg(long, value_enum)]
        category: Option<TaskCategory>,
        /// Clear the work category.
        #[arg(long)]
        clear_category: bool,
    },
    /// Remove a task.
    Rm {
        /// Task ID or description
        task: String,
    },
    /// List tasks with estimates and weighted averages.
    List {
        /// Only list tasks of this module.
        #[arg(long)]
        module: Option<String>,
    },
    /// Set or advance a task's status.
    Status {
        /// Task ID or description
        task: String,
        /// New status. Omit to advance pending -> in-progress -> completed.
        #[arg(value_enum)]
        status: Option<TaskStatus>,
    },
}

#[derive(Subcommand)]
pub enum RiskAction {
    /// Add a risk.
    Add {
        /// Risk description
        description: String,
        /// Time reserve if the risk materialises
        #[arg(allow_negative_numbers = true)]
        time: Decimal,
        /// Unit of the time reserve: minutes | hours | days.
        #[arg(long, value_enum, default_value_t = TimeUnit::Hours)]
        unit: TimeUnit,
        /// Probability: low | medium | high.
        #[arg(long, value_enum)]
        probability: RiskLevel,
        /// Impact severity: low | medium | high.
        #[arg(long, value_enum)]
        impact: RiskLevel,
    },
    /// Remove a risk.
    Rm {
        /// Risk ID or description
        risk: String,
    },
    /// List risks with priority scores.
    List,
    /// Show the probability/impact matrix.
    Matrix,
}

#[derive(Subcommand)]
pub enum DepAction {
    /// Make a task depend on a predecessor.
    Add {
        /// Task ID or description that gains the dependency
        task: String,
        /// Task ID or description it depends on
        predecessor: String,
    },
    /// Remove a dependency.
    Rm {
        /// Task ID or description
        task: String,
        /// Predecessor to remove
        predecessor: String,
    },
    /// List all dependencies.
    List,
    /// Apply dependency suggestions from a JSON file.
    Apply {
        /// Path to the suggestions JSON file
        input: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Import a generated plan, replacing all modules.
    Import {
        /// Path to the plan JSON file
        input: PathBuf,
    },
}

/// Refresh derived totals and write the project back to disk.
fn persist(project: &mut Project, path: &Path) {
    project.touch();
    project.recompute();
    if let Err(e) = save_project(project, path) {
        eprintln!("Failed to save project: {e}");
        std::process::exit(1);
    }
}

fn resolve_module_or_exit(project: &Project, identifier: &str) -> String {
    match project.resolve_module(identifier) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn resolve_task_or_exit(project: &Project, identifier: &str) -> String {
    match project.resolve_task(identifier) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn resolve_risk_or_exit(project: &Project, identifier: &str) -> String {
    match project.resolve_risk(identifier) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// First eight characters of an id, for compact table display.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Render a cycle as "a -> b -> a" using task descriptions where available.
fn format_cycle(project: &Project, cycle: &[String]) -> String {
    cycle
        .iter()
        .map(|id| {
            project
                .find_task(id)
                .map(|t| t.description.clone())
                .unwrap_or_else(|| short_id(id))
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn warn_on_cycle(project: &Project) {
    if let Some(cycle) = schedule::find_cycle(&project.modules) {
        eprintln!(
            "Warning: dependency cycle detected: {}",
            format_cycle(project, &cycle)
        );
    }
}

/// Create a new project file in the PE directory.
pub fn cmd_new(name: String, pe_dir: &Path) {
    match create_project(&name, pe_dir) {
        Ok((stored, project)) => {
            println!("Created project '{}' ({})", stored.display_name, project.id);
        }
        Err(e) => {
            eprintln!("Failed to create project: {e}");
            std::process::exit(1);
        }
    }
}

/// List all projects, most recently updated first.
pub fn cmd_projects(pe_dir: &Path) {
    let stored = match discover_projects(pe_dir) {
        Ok(stored) => stored,
        Err(e) => {
            eprintln!("Failed to list projects: {e}");
            std::process::exit(1);
        }
    };
    if stored.is_empty() {
        println!("No projects found. Create one with 'pe new <name>'.");
        return;
    }

    let mut rows = Vec::new();
    for entry in stored {
        match load_project(&entry.file_path) {
            Ok(project) => rows.push((entry, project)),
            Err(e) => eprintln!("Skipping {}: {e}", entry.file_path.display()),
        }
    }
    rows.sort_by(|a, b| b.1.updated_at.cmp(&a.1.updated_at));

    println!(
        "{:<24} {:<6} {:<6} {:<17} {}",
        "Name", "Tasks", "Risks", "Updated", "ID"
    );
    for (entry, project) in rows {
        println!(
            "{:<24} {:<6} {:<6} {:<17} {}",
            truncate(&entry.display_name, 24),
            project.all_tasks().count(),
            project.risks.len(),
            project.updated_at.format("%Y-%m-%d %H:%M"),
            project.id
        );
    }
}

/// Delete a project file.
pub fn cmd_delete(identifier: String, pe_dir: &Path) {
    let stored = match find_project(&identifier, pe_dir) {
        Ok(stored) => stored,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = fs::remove_file(&stored.file_path) {
        eprintln!("Failed to delete project: {e}");
        std::process::exit(1);
    }
    println!("Deleted project '{}'", stored.display_name);
}

/// Show the project's time and cost roll-up.
pub fn cmd_summary(project: &mut Project) {
    let totals = project.recompute();
    println!("Project: {} ({})", project.name, project.id);
    println!(
        "Modules: {}  Tasks: {}  Risks: {}",
        project.modules.len(),
        project.all_tasks().count(),
        project.risks.len()
    );
    println!();
    println!(
        "Tasks time:     {:>12} min  ({})",
        format_minutes_value(totals.tasks_time),
        time::format_minutes(totals.tasks_time)
    );
    println!(
        "Risk reserve:   {:>12} min  ({})",
        format_minutes_value(totals.risk_time),
        time::format_minutes(totals.risk_time)
    );
    println!(
        "Base time:      {:>12} min  ({})",
        format_minutes_value(totals.base_time),
        time::format_minutes(totals.base_time)
    );
    println!(
        "Adjusted time:  {:>12} min  ({}) at x{} effort",
        format_minutes_value(totals.adjusted_time),
        time::format_minutes(totals.adjusted_time),
        project.effort_multiplier.normalize()
    );
    println!(
        "Estimated cost: {} ({}/h plus {} fixed)",
        format_cost(totals.cost),
        format_cost(project.hourly_rate),
        format_cost(project.fixed_costs)
    );
}

/// Show scenario totals with per-module and per-category breakdowns.
pub fn cmd_analytics(project: &mut Project) {
    project.recompute();
    let scenarios = ScenarioTotals::compute(
        &project.modules,
        &project.risks,
        project.effort_multiplier,
    );
    println!(
        "Scenario totals at x{} effort:",
        project.effort_multiplier.normalize()
    );
    println!(
        "  {:<12} {:>12} min  ({})",
        "Optimistic",
        format_minutes_value(scenarios.optimistic),
        time::format_minutes(scenarios.optimistic)
    );
    println!(
        "  {:<12} {:>12} min  ({})",
        "Realistic",
        format_minutes_value(scenarios.realistic),
        time::format_minutes(scenarios.realistic)
    );
    println!(
        "  {:<12} {:>12} min  ({})",
        "Pessimistic",
        format_minutes_value(scenarios.pessimistic),
        time::format_minutes(scenarios.pessimistic)
    );

    let rows = module_breakdown(&project.modules);
    if !rows.is_empty() {
        println!();
        println!(
            "{:<24} {:>12} {:>12} {:>12}",
            "Module", "Optimistic", "Realistic", "Pessimistic"
        );
        for row in rows {
            println!(
                "{:<24} {:>12} {:>12} {:>12}",
                truncate(&row.module_name, 24),
                format_minutes_value(row.optimistic),
                format_minutes_value(row.realistic),
                format_minutes_value(row.pessimistic)
            );
        }
    }

    let shares = category_distribution(&project.modules);
    if !shares.is_empty() {
        let total: Decimal = shares.iter().map(|s| s.total_minutes).sum();
        println!();
        println!("{:<24} {:>12} {:>7}", "Category", "Minutes", "Share");
        for share in shares {
            let percent = if total.is_zero() {
                Decimal::ZERO
            } else {
                (share.total_minutes / total * Decimal::from(100)).round_dp(1)
            };
            println!(
                "{:<24} {:>12} {:>6}%",
                format_category(share.category),
                format_minutes_value(share.total_minutes),
                percent.normalize()
            );
        }
    }
}

/// Update the project name, requirements document or costing settings.
pub fn cmd_set(
    project: &mut Project,
    path: &Path,
    name: Option<String>,
    requirements: Option<String>,
    requirements_file: Option<PathBuf>,
    effort_multiplier: Option<Decimal>,
    hourly_rate: Option<Decimal>,
    fixed_costs: Option<Decimal>,
) {
    if name.is_none()
        && requirements.is_none()
        && requirements_file.is_none()
        && effort_multiplier.is_none()
        && hourly_rate.is_none()
        && fixed_costs.is_none()
    {
        eprintln!("Nothing to set. Pass at least one option.");
        std::process::exit(1);
    }
    if requirements.is_some() && requirements_file.is_some() {
        eprintln!("Use either --requirements or --requirements-file, not both.");
        std::process::exit(1);
    }

    let mut target_path = path.to_path_buf();
    let mut renamed_from: Option<PathBuf> = None;
    if let Some(new_name) = name {
        let new_name = new_name.trim().to_string();
        if new_name.is_empty() {
            eprintln!("Project name cannot be empty");
            std::process::exit(1);
        }
        // Move the file along with the rename when it follows the store layout.
        if StoredProject::from_file(path.to_path_buf()).is_some()
            && sanitize_project_name(&new_name) != sanitize_project_name(&project.name)
        {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            let target = StoredProject::new(&new_name, parent);
            if target.file_path.exists() {
                eprintln!("Project '{}' already exists", new_name);
                std::process::exit(1);
            }
            renamed_from = Some(path.to_path_buf());
            target_path = target.file_path;
        }
        project.name = new_name;
    }
    if let Some(text) = requirements {
        project.requirements_document = text;
    }
    if let Some(file) = requirements_file {
        match fs::read_to_string(&file) {
            Ok(text) => project.requirements_document = text,
            Err(e) => {
                eprintln!("Failed to read {}: {e}", file.display());
                std::process::exit(1);
            }
        }
    }
    if let Some(multiplier) = effort_multiplier {
        if multiplier <= Decimal::ZERO {
            eprintln!("Effort multiplier must be positive");
            std::process::exit(1);
        }
        project.effort_multiplier = multiplier;
    }
    if let Some(rate) = hourly_rate {
        project.hourly_rate = rate.max(Decimal::ZERO);
    }
    if let Some(costs) = fixed_costs {
        project.fixed_costs = costs.max(Decimal::ZERO);
    }

    persist(project, &target_path);
    if let Some(old) = renamed_from {
        if old != target_path {
            if let Err(e) = fs::remove_file(&old) {
                eprintln!("Warning: failed to remove old project file {}: {e}", old.display());
            }
        }
    }
    println!("Updated project settings");
}

/// Handle module management commands.
pub fn cmd_module(project: &mut Project, path: &Path, action: ModuleAction) {
    match action {
        ModuleAction::Add { name } => {
            if name.trim().is_empty() {
                eprintln!("Module name cannot be empty");
                std::process::exit(1);
            }
            let module = Module::new(name.trim());
            let id = module.id.clone();
            project.modules.push(module);
            persist(project, path);
            println!("Added module {}", id);
        }
        ModuleAction::Rename { module, name } => {
            let id = resolve_module_or_exit(project, &module);
            if name.trim().is_empty() {
                eprintln!("Module name cannot be empty");
                std::process::exit(1);
            }
            if let Some(found) = project.find_module_mut(&id) {
                found.name = name.trim().to_string();
            }
            persist(project, path);
            println!("Renamed module {}", id);
        }
        ModuleAction::Rm { module } => {
            let id = resolve_module_or_exit(project, &module);
            match project.remove_module(&id) {
                Some(removed) => {
                    persist(project, path);
                    println!(
                        "Removed module '{}' and {} tasks",
                        removed.name,
                        removed.tasks.len()
                    );
                }
                None => {
                    eprintln!("No module found matching '{}'", module);
                    std::process::exit(1);
                }
            }
        }
        ModuleAction::List => {
            if project.modules.is_empty() {
                println!("No modules.");
                return;
            }
            println!(
                "{:<10} {:<24} {:<6} {:>10}  {}",
                "ID", "Name", "Tasks", "Minutes", "Time"
            );
            for module in &project.modules {
                let minutes: Decimal = module
                    .tasks
                    .iter()
                    .map(|t| t.weighted_average_time_in_minutes)
                    .sum();
                println!(
                    "{:<10} {:<24} {:<6} {:>10}  {}",
                    short_id(&module.id),
                    truncate(&module.name, 24),
                    module.tasks.len(),
                    format_minutes_value(minutes),
                    time::format_minutes(minutes)
                );
            }
        }
    }
}

/// Handle task management commands.
pub fn cmd_task(project: &mut Project, path: &Path, action: TaskAction) {
    match action {
        TaskAction::Add {
            module,
            description,
            optimistic,
            most_likely,
            pessimistic,
            unit,
            category,
        } => {
            let module_id = resolve_module_or_exit(project, &module);
            if description.trim().is_empty() {
                eprintln!("Task description cannot be empty");
                std::process::exit(1);
            }
            if let Err(e) = validate_estimates(optimistic, most_likely, pessimistic) {
                eprintln!("{e}");
                std::process::exit(1);
            }
            let task = Task::new(
                description.trim(),
                optimistic,
                most_likely,
                pessimistic,
                unit,
                category,
            );
            let id = task.id.clone();
            if let Some(found) = project.find_module_mut(&module_id) {
                found.tasks.push(task);
            }
            persist(project, path);
            println!("Added task {}", id);
        }
        TaskAction::Update {
            task,
            description,
            optimistic,
            most_likely,
            pessimistic,
            unit,
            category,
            clear_category,
        } => {
            let id = resolve_task_or_exit(project, &task);
            if category.is_some() && clear_category {
                eprintln!("Use either --category or --clear-category, not both.");
                std::process::exit(1);
            }
            if let Some(ref text) = description {
                if text.trim().is_empty() {
                    eprintln!("Task description cannot be empty");
                    std::process::exit(1);
                }
            }
            let current = match project.find_task(&id) {
                Some(found) => found.clone(),
                None => {
                    eprintln!("No task found matching '{}'", task);
                    std::process::exit(1);
                }
            };
            // Validate the estimates as they will be after the update.
            let o = optimistic.unwrap_or(current.optimistic_time);
            let m = most_likely.unwrap_or(current.most_likely_time);
            let p = pessimistic.unwrap_or(current.pessimistic_time);
            if let Err(e) = validate_estimates(o, m, p) {
                eprintln!("{e}");
                std::process::exit(1);
            }
            if let Some(found) = project.find_task_mut(&id) {
                if let Some(text) = description {
                    found.description = text.trim().to_string();
                }
                found.optimistic_time = o;
                found.most_likely_time = m;
                found.pessimistic_time = p;
                if let Some(new_unit) = unit {
                    found.time_unit = new_unit;
                }
                if clear_category {
                    found.category = None;
                }
                if let Some(new_category) = category {
                    found.category = Some(new_category);
                }
            }
            persist(project, path);
            println!("Updated task {}", id);
        }
        TaskAction::Rm { task } => {
            let id = resolve_task_or_exit(project, &task);
            if project.remove_task(&id) {
                persist(project, path);
                println!("Removed task {}", id);
            } else {
                eprintln!("No task found matching '{}'", task);
                std::process::exit(1);
            }
        }
        TaskAction::List { module } => {
            let filter = module.map(|m| resolve_module_or_exit(project, &m));
            let mut any = false;
            for module in &project.modules {
                if let Some(ref filter_id) = filter {
                    if &module.id != filter_id {
                        continue;
                    }
                }
                for task in &module.tasks {
                    if !any {
                        println!(
                            "{:<10} {:<16} {:<12} {:<22} {:<16} {:>9}  {}",
                            "ID", "Module", "Status", "Category", "Estimate", "Minutes", "Description"
                        );
                        any = true;
                    }
                    let estimate = format!(
                        "{}/{}/{} {}",
                        task.optimistic_time.normalize(),
                        task.most_likely_time.normalize(),
                        task.pessimistic_time.normalize(),
                        format_unit(task.time_unit)
                    );
                    println!(
                        "{:<10} {:<16} {:<12} {:<22} {:<16} {:>9}  {}",
                        short_id(&task.id),
                        truncate(&module.name, 16),
                        format_task_status(task.status),
                        truncate(format_category(task.category), 22),
                        truncate(&estimate, 16),
                        format_minutes_value(task.weighted_average_time_in_minutes),
                        task.description
                    );
                }
            }
            if !any {
                println!("No tasks.");
            }
        }
        TaskAction::Status { task, status } => {
            let id = resolve_task_or_exit(project, &task);
            let new_status = match (status, project.find_task(&id)) {
                (Some(explicit), _) => explicit,
                (None, Some(found)) => progress::next_status(found.status),
                (None, None) => {
                    eprintln!("No task found matching '{}'", task);
                    std::process::exit(1);
                }
            };
            if let Some(found) = project.find_task_mut(&id) {
                found.status = new_status;
            }
            persist(project, path);
            println!("Task {} is now {}", short_id(&id), format_task_status(new_status));
        }
    }
}

/// Handle risk management commands.
pub fn cmd_risk(project: &mut Project, path: &Path, action: RiskAction) {
    match action {
        RiskAction::Add {
            description,
            time,
            unit,
            probability,
            impact,
        } => {
            if description.trim().is_empty() {
                eprintln!("Risk description cannot be empty");
                std::process::exit(1);
            }
            if time < Decimal::ZERO {
                eprintln!("Risk time must not be negative");
                std::process::exit(1);
            }
            let entry = Risk::new(description.trim(), time, unit, probability, impact);
            let id = entry.id.clone();
            project.risks.push(entry);
            persist(project, path);
            println!("Added risk {}", id);
        }
        RiskAction::Rm { risk } => {
            let id = resolve_risk_or_exit(project, &risk);
            project.risks.retain(|r| r.id != id);
            persist(project, path);
            println!("Removed risk {}", id);
        }
        RiskAction::List => {
            if project.risks.is_empty() {
                println!("No risks.");
                return;
            }
            println!(
                "{:<10} {:<8} {:<8} {:>9} {:>6} {:<9}  {}",
                "ID", "Prob", "Impact", "Minutes", "RPI", "Band", "Description"
            );
            for entry in &project.risks {
                let score = risk::priority_index(entry);
                println!(
                    "{:<10} {:<8} {:<8} {:>9} {:>6} {:<9}  {}",
                    short_id(&entry.id),
                    format_level(entry.probability),
                    format_level(entry.impact_severity),
                    format_minutes_value(entry.risk_time_in_minutes),
                    score.round_dp(2).normalize(),
                    format_band(risk::band(score)),
                    entry.description
                );
            }
        }
        RiskAction::Matrix => {
            let cells = risk::matrix(&project.risks);
            println!(
                "{:<14} {:<24} {:<24} {:<24}",
                "Prob \\ Impact", "Low", "Medium", "High"
            );
            for (row, label) in [(2usize, "High"), (1, "Medium"), (0, "Low")] {
                let rendered: Vec<String> = (0..3)
                    .map(|col| {
                        let cell = &cells[row][col];
                        if cell.risk_ids.is_empty() {
                            "-".to_string()
                        } else {
                            let average = cell.average_index();
                            format!(
                                "{} @ {} ({})",
                                cell.risk_ids.len(),
                                average.round_dp(2).normalize(),
                                format_band(risk::band(average))
                            )
                        }
                    })
                    .collect();
                println!(
                    "{:<14} {:<24} {:<24} {:<24}",
                    label, rendered[0], rendered[1], rendered[2]
                );
            }
        }
    }
}

/// Handle dependency management commands.
pub fn cmd_dep(project: &mut Project, path: &Path, action: DepAction) {
    match action {
        DepAction::Add { task, predecessor } => {
            let task_id = resolve_task_or_exit(project, &task);
            let pred_id = resolve_task_or_exit(project, &predecessor);
            if task_id == pred_id {
                eprintln!("A task cannot depend on itself.");
                std::process::exit(1);
            }
            let already = project
                .find_task(&task_id)
                .map(|t| t.predecessor_task_ids.contains(&pred_id))
                .unwrap_or(false);
            if already {
                println!("Dependency already exists.");
                return;
            }
            if let Some(found) = project.find_task_mut(&task_id) {
                found.predecessor_task_ids.push(pred_id.clone());
            }
            persist(project, path);
            println!(
                "Task {} now depends on {}",
                short_id(&task_id),
                short_id(&pred_id)
            );
            warn_on_cycle(project);
        }
        DepAction::Rm { task, predecessor } => {
            let task_id = resolve_task_or_exit(project, &task);
            let pred_id = resolve_task_or_exit(project, &predecessor);
            let mut removed = false;
            if let Some(found) = project.find_task_mut(&task_id) {
                let before = found.predecessor_task_ids.len();
                found.predecessor_task_ids.retain(|p| p != &pred_id);
                removed = found.predecessor_task_ids.len() != before;
            }
            if !removed {
                eprintln!(
                    "Task {} does not depend on {}",
                    short_id(&task_id),
                    short_id(&pred_id)
                );
                std::process::exit(1);
            }
            persist(project, path);
            println!(
                "Task {} no longer depends on {}",
                short_id(&task_id),
                short_id(&pred_id)
            );
        }
        DepAction::List => {
            let mut any = false;
            for task in project.all_tasks() {
                for pred_id in &task.predecessor_task_ids {
                    if !any {
                        println!("{:<44} {}", "Task", "Depends on");
                        any = true;
                    }
                    let pred_label = project
                        .find_task(pred_id)
                        .map(|p| p.description.as_str())
                        .unwrap_or("(missing)");
                    println!(
                        "{:<44} {} [{}]",
                        truncate(
                            &format!("{} [{}]", task.description, short_id(&task.id)),
                            44
                        ),
                        pred_label,
                        short_id(pred_id)
                    );
                }
            }
            if !any {
                println!("No dependencies.");
            }
        }
        DepAction::Apply { input } => {
            let raw = match fs::read_to_string(&input) {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!("Failed to read {}: {e}", input.display());
                    std::process::exit(1);
                }
            };
            let suggestions: DependencySuggestions = match serde_json::from_str(&raw) {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    eprintln!("Invalid suggestions file: {e}");
                    std::process::exit(1);
                }
            };
            let changed = apply_suggestions(project, suggestions);
            if changed == 0 {
                println!("No new dependencies to apply.");
                return;
            }
            persist(project, path);
            println!("Applied suggestions to {} tasks", changed);
            warn_on_cycle(project);
        }
    }
}

/// Compute and print the critical path schedule.
pub fn cmd_critical_path(project: &mut Project) {
    project.recompute();
    if let Some(cycle) = schedule::find_cycle(&project.modules) {
        eprintln!(
            "Cannot compute the critical path: dependency cycle detected: {}",
            format_cycle(project, &cycle)
        );
        std::process::exit(1);
    }
    let analysis = schedule::analyze(&project.modules);
    if analysis.tasks.is_empty() {
        println!("No tasks to schedule.");
        return;
    }
    println!(
        "Project duration: {} minutes ({})",
        format_minutes_value(analysis.project_duration),
        time::format_minutes(analysis.project_duration)
    );
    println!();
    println!(
        "{:<10} {:>9} {:>9} {:>9} {:>9} {:>9}  {}",
        "ID", "ES", "EF", "LS", "LF", "Slack", "Task"
    );
    for entry in &analysis.tasks {
        let description = project
            .find_task(&entry.task_id)
            .map(|t| t.description.as_str())
            .unwrap_or("-");
        let marker = if entry.on_critical_path { "* " } else { "  " };
        println!(
            "{:<10} {:>9} {:>9} {:>9} {:>9} {:>9}  {}{}",
            short_id(&entry.task_id),
            format_minutes_value(entry.earliest_start),
            format_minutes_value(entry.earliest_finish),
            format_minutes_value(entry.latest_start),
            format_minutes_value(entry.latest_finish),
            format_minutes_value(entry.slack),
            marker,
            description
        );
    }
    if !analysis.critical_task_ids.is_empty() {
        println!();
        let labels: Vec<String> = analysis
            .critical_task_ids
            .iter()
            .map(|id| {
                project
                    .find_task(id)
                    .map(|t| t.description.clone())
                    .unwrap_or_else(|| short_id(id))
            })
            .collect();
        println!("Critical path: {}", labels.join(" -> "));
    }
}

/// Show task progress per status and module.
pub fn cmd_progress(project: &mut Project) {
    project.recompute();
    let report = progress::report(&project.modules);
    let overall = &report.overall;
    if overall.total_tasks == 0 {
        println!("No tasks.");
        return;
    }
    println!(
        "Overall: {}% complete ({} of {} tasks)",
        overall.completion_percentage(),
        overall.completed,
        overall.total_tasks
    );
    println!(
        "  Pending:     {:>4}  ({})",
        overall.pending,
        time::format_minutes(overall.pending_time)
    );
    println!(
        "  In progress: {:>4}  ({})",
        overall.in_progress,
        time::format_minutes(overall.in_progress_time)
    );
    println!(
        "  Completed:   {:>4}  ({})",
        overall.completed,
        time::format_minutes(overall.completed_time)
    );
    println!();
    println!(
        "{:<24} {:>6} {:>8} {:>12} {:>10} {:>5}",
        "Module", "Tasks", "Pending", "In Progress", "Completed", "%"
    );
    for entry in &report.modules {
        let breakdown = &entry.breakdown;
        println!(
            "{:<24} {:>6} {:>8} {:>12} {:>10} {:>4}%",
            truncate(&entry.module_name, 24),
            breakdown.total_tasks,
            breakdown.pending,
            breakdown.in_progress,
            breakdown.completed,
            breakdown.completion_percentage()
        );
    }
}

/// Handle plan import commands.
pub fn cmd_plan(project: &mut Project, path: &Path, action: PlanAction) {
    match action {
        PlanAction::Import { input } => {
            let raw = match fs::read_to_string(&input) {
                Ok(raw) => raw,
                Err(e) => {
                    eprintln!("Failed to read {}: {e}", input.display());
                    std::process::exit(1);
                }
            };
            let parsed: GeneratedPlan = match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    eprintln!("Invalid plan file: {e}");
                    std::process::exit(1);
                }
            };
            let (modules, tasks) = apply_plan(project, parsed);
            persist(project, path);
            println!("Imported plan: {} modules, {} tasks", modules, tasks);
        }
    }
}

/// Export the project with a summary block.
pub fn cmd_export(project: &mut Project, output: Option<PathBuf>) {
    let totals = project.recompute();
    let output = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}-export.json", sanitize_project_name(&project.name)))
    });
    if let Err(e) = export_project(project, &totals, &output) {
        eprintln!("Failed to export project: {e}");
        std::process::exit(1);
    }
    println!("Exported project to {}", output.display());
}

/// Import a project file into the PE directory.
pub fn cmd_import(input: PathBuf, pe_dir: &Path) {
    match import_project(&input, pe_dir) {
        Ok((stored, project)) => {
            println!("Imported project '{}' ({})", stored.display_name, project.id);
        }
        Err(e) => {
            eprintln!("Failed to import project: {e}");
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
