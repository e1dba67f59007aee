//! Project file persistence and shared display helpers.
//!
//! Each project is stored as an individual JSON file with the naming
//! convention `<project_name>_project.json` inside the PE directory
//! (default `~/.pe`). Saves write to a temp file and rename over the target,
//! so an interrupted save never leaves a half-written project behind.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::estimate::ProjectTotals;
use crate::fields::{RiskBand, RiskLevel, TaskCategory, TaskStatus, TimeUnit};
use crate::project::Project;
use crate::time;

/// Failure while reading or writing project files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid project file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Project name cannot be empty")]
    EmptyName,

    #[error("Project '{0}' already exists")]
    AlreadyExists(String),

    #[error("No project found matching '{0}'")]
    NotFound(String),

    #[error("Multiple projects match '{0}'")]
    Ambiguous(String),
}

/// A project file discovered in the PE directory.
#[derive(Debug, Clone)]
pub struct StoredProject {
    pub name: String,
    pub display_name: String,
    pub file_path: PathBuf,
}

impl StoredProject {
    /// Create a file handle for a project with the given display name.
    pub fn new(display_name: &str, pe_dir: &Path) -> Self {
        let name = sanitize_project_name(display_name);
        let file_path = pe_dir.join(format!("{}_project.json", name));

        StoredProject {
            name,
            display_name: display_name.to_string(),
            file_path,
        }
    }

    /// Interpret an existing file as a project file.
    pub fn from_file(file_path: PathBuf) -> Option<Self> {
        let file_name = file_path.file_stem()?.to_str()?;
        if !file_name.ends_with("_project") {
            return None;
        }
        let name = file_name.strip_suffix("_project")?;
        let display_name = name.replace('_', " ");

        Some(StoredProject {
            name: name.to_string(),
            display_name,
            file_path,
        })
    }
}

/// Convert a display name to a safe file name component.
/// Lowercases, folds every non-alphanumeric run into a single underscore.
pub fn sanitize_project_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Discover all project files in the PE directory, sorted by display name.
pub fn discover_projects(pe_dir: &Path) -> Result<Vec<StoredProject>, StoreError> {
    let mut projects = Vec::new();

    if !pe_dir.exists() {
        return Ok(projects);
    }

    for entry in fs::read_dir(pe_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(project) = StoredProject::from_file(path) {
                projects.push(project);
            }
        }
    }

    projects.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    Ok(projects)
}

/// Find the most recently modified project in the PE directory.
pub fn get_most_recent_project(pe_dir: &Path) -> Result<Option<StoredProject>, StoreError> {
    let projects = discover_projects(pe_dir)?;

    let mut most_recent: Option<(StoredProject, std::time::SystemTime)> = None;

    for project in projects {
        if let Ok(metadata) = fs::metadata(&project.file_path) {
            if let Ok(modified) = metadata.modified() {
                match most_recent {
                    None => most_recent = Some((project, modified)),
                    Some((_, current_time)) => {
                        if modified > current_time {
                            most_recent = Some((project, modified));
                        }
                    }
                }
            }
        }
    }

    Ok(most_recent.map(|(project, _)| project))
}

/// Create a new, empty project file.
pub fn create_project(display_name: &str, pe_dir: &Path) -> Result<(StoredProject, Project), StoreError> {
    if display_name.trim().is_empty() {
        return Err(StoreError::EmptyName);
    }

    let stored = StoredProject::new(display_name, pe_dir);
    if stored.file_path.exists() {
        return Err(StoreError::AlreadyExists(display_name.to_string()));
    }

    let project = Project::new(display_name);
    save_project(&project, &stored.file_path)?;

    Ok((stored, project))
}

/// Resolve a project identifier against the PE directory.
///
/// Accepts a display name, a sanitized file name, a project id or a unique
/// id prefix. Id lookups open each candidate file.
pub fn find_project(identifier: &str, pe_dir: &Path) -> Result<StoredProject, StoreError> {
    let projects = discover_projects(pe_dir)?;

    let sanitized = sanitize_project_name(identifier);
    if let Some(stored) = projects.iter().find(|p| {
        p.name == sanitized || p.display_name.to_lowercase() == identifier.to_lowercase()
    }) {
        return Ok(stored.clone());
    }

    let mut by_id: Vec<&StoredProject> = Vec::new();
    for stored in &projects {
        if let Ok(project) = load_project(&stored.file_path) {
            if project.id == identifier {
                return Ok(stored.clone());
            }
            if project.id.starts_with(identifier) {
                by_id.push(stored);
            }
        }
    }
    match by_id.len() {
        0 => Err(StoreError::NotFound(identifier.to_string())),
        1 => Ok(by_id[0].clone()),
        _ => Err(StoreError::Ambiguous(identifier.to_string())),
    }
}

/// Load a project from its JSON file.
pub fn load_project(path: &Path) -> Result<Project, StoreError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Save a project atomically via a temp file and rename.
pub fn save_project(project: &Project, path: &Path) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    let raw = serde_json::to_string_pretty(project)?;
    let mut file = File::create(&tmp)?;
    file.write_all(raw.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Summary block attached to exported project files.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummary {
    total_base_time_in_minutes: String,
    total_base_time_formatted: String,
    total_adjusted_time_in_minutes: String,
    total_adjusted_time_formatted: String,
    total_project_cost: String,
    total_project_cost_formatted: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedProject<'a> {
    #[serde(flatten)]
    project: &'a Project,
    project_summary: ProjectSummary,
}

/// Render the export document: the full project plus a summary block with
/// both machine and human readable totals.
pub fn render_export(project: &Project, totals: &ProjectTotals) -> Result<String, StoreError> {
    let summary = ProjectSummary {
        total_base_time_in_minutes: totals.base_time.normalize().to_string(),
        total_base_time_formatted: time::format_minutes(totals.base_time),
        total_adjusted_time_in_minutes: totals.adjusted_time.normalize().to_string(),
        total_adjusted_time_formatted: time::format_minutes(totals.adjusted_time),
        total_project_cost: totals.cost.normalize().to_string(),
        total_project_cost_formatted: format_cost(totals.cost),
    };
    let document = ExportedProject {
        project,
        project_summary: summary,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Write the export document to a file.
pub fn export_project(project: &Project, totals: &ProjectTotals, path: &Path) -> Result<(), StoreError> {
    let raw = render_export(project, totals)?;
    fs::write(path, raw)?;
    Ok(())
}

/// Import a project file into the PE directory.
///
/// Derived totals are recomputed on the way in. The project gets a fresh id
/// when one with the same id already exists, and a suffixed file name when
/// its natural name is taken.
pub fn import_project(input: &Path, pe_dir: &Path) -> Result<(StoredProject, Project), StoreError> {
    let mut project = load_project(input)?;
    if project.name.trim().is_empty() {
        return Err(StoreError::EmptyName);
    }
    project.recompute();

    let existing = discover_projects(pe_dir)?;
    let taken = existing
        .iter()
        .filter_map(|stored| load_project(&stored.file_path).ok())
        .any(|p| p.id == project.id);
    if taken {
        project.id = Uuid::new_v4().to_string();
    }

    let mut stored = StoredProject::new(&project.name, pe_dir);
    if stored.file_path.exists() {
        let short: String = project.id.chars().take(8).collect();
        stored = StoredProject::new(&format!("{} {}", project.name, short), pe_dir);
    }
    save_project(&project, &stored.file_path)?;

    Ok((stored, project))
}

/// Format a time unit for display.
pub fn format_unit(u: TimeUnit) -> &'static str {
    match u {
        TimeUnit::Minutes => "minutes",
        TimeUnit::Hours => "hours",
        TimeUnit::Days => "days",
    }
}

/// Format a task category for display.
pub fn format_category(c: Option<TaskCategory>) -> &'static str {
    match c {
        Some(TaskCategory::Design) => "Design",
        Some(TaskCategory::DevelopmentFrontend) => "Development (Frontend)",
        Some(TaskCategory::DevelopmentBackend) => "Development (Backend)",
        Some(TaskCategory::ApiDevelopment) => "API Development",
        Some(TaskCategory::Database) => "Database",
        Some(TaskCategory::TestingQa) => "Testing/QA",
        Some(TaskCategory::Deployment) => "Deployment",
        Some(TaskCategory::Management) => "Management",
        Some(TaskCategory::Documentation) => "Documentation",
        Some(TaskCategory::Research) => "Research",
        Some(TaskCategory::Communication) => "Communication",
        Some(TaskCategory::Other) => "Other",
        None => "-",
    }
}

/// Format a task status for display.
pub fn format_task_status(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::Pending => "Pending",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Completed",
    }
}

/// Format a risk level for display.
pub fn format_level(l: RiskLevel) -> &'static str {
    match l {
        RiskLevel::Low => "Low",
        RiskLevel::Medium => "Medium",
        RiskLevel::High => "High",
    }
}

/// Format a severity band for display.
pub fn format_band(b: RiskBand) -> &'static str {
    match b {
        RiskBand::Low => "Low",
        RiskBand::Medium => "Medium",
        RiskBand::High => "High",
        RiskBand::Critical => "Critical",
    }
}

/// Format a monetary amount for display.
pub fn format_cost(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// Format a minute value for table cells, capped at two decimal places.
pub fn format_minutes_value(minutes: Decimal) -> String {
    minutes.round_dp(2).normalize().to_string()
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
