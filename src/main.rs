//! # PE - Project Estimation CLI
//!
//! A command-line estimation tool for software projects built around PERT
//! three-point estimates, with critical path analysis, risk scoring and cost
//! roll-ups.
//!
//! ## Key Features
//!
//! - **Three-Point Estimates**: Every task carries optimistic, most likely and
//! pessimistic times; the weighted average (O + 4M + P) / 6 drives all totals
//! - **Workday Time Model**: Estimates in minutes, hours or 8-hour days,
//! formatted back as "2 days 3 hours 30 minutes"
//! - **Critical Path**: Task dependencies feed a full forward/backward pass
//! with slack per task and the critical chain highlighted
//! - **Risk Register**: Probability/impact scoring with time reserves that
//! flow into the project totals, plus a 3x3 risk matrix view
//! - **Cost Roll-Ups**: Hourly rate, fixed costs and an effort multiplier turn
//! time into money, computed with exact decimal arithmetic
//! - **Plan Import**: Generated plans and dependency suggestions load from
//! JSON, so estimates can start from machine-produced breakdowns
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project and a module
//! pe new "Checkout Rework"
//! pe module add "Payment API"
//!
//! # Add a task: optimistic / most likely / pessimistic, in hours by default
//! pe task add "Payment API" "Integrate PSP sandbox" 4 6 10
//!
//! # Wire dependencies and inspect the schedule
//! pe dep add "Ship to staging" "Integrate PSP sandbox"
//! pe critical-path
//!
//! # Totals and scenarios
//! pe summary
//! pe analytics
//! ```
//!
//! ## Installation
//!
//! ```bash
//! git clone <repository-url>
//! cd project_estimation
//! cargo install --path .
//! ```
//!
//! ## Key Commands
//!
//! - `pe new <name>` - Create a project
//! - `pe task add` - Add a task with three-point estimates
//! - `pe risk add` - Register a risk with probability and impact
//! - `pe critical-path` - Compute the schedule and critical chain
//! - `pe progress` - Track status counts per module
//! - `pe export` - Write the project with a human-readable summary block
//!
//! Data is stored locally in `~/.pe/` with each project as a separate JSON
//! file. We recommend you source control this folder via `git init` and back
//! it up periodically.

use std::path::{Path, PathBuf};

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod estimate;
pub mod fields;
pub mod plan;
pub mod progress;
pub mod project;
pub mod risk;
pub mod schedule;
pub mod store;
pub mod task;
pub mod time;

use cli::Cli;
use cmd::*;
use store::*;

fn main() {
    let cli = Cli::parse();

    // Determine PE directory
    let pe_dir = if let Some(db_path) = cli.db.as_ref() {
        db_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let pe_dir = PathBuf::from(home).join(".pe");
        if let Err(e) = std::fs::create_dir_all(&pe_dir) {
            eprintln!("Failed to create pe directory {}: {}", pe_dir.display(), e);
            std::process::exit(1);
        }
        pe_dir
    };

    // Handle commands that work on the PE directory rather than one project
    match &cli.command {
        Commands::New { name } => {
            cmd_new(name.clone(), &pe_dir);
            return;
        },
        Commands::Projects => {
            cmd_projects(&pe_dir);
            return;
        },
        Commands::Delete { project } => {
            cmd_delete(project.clone(), &pe_dir);
            return;
        },
        Commands::Import { input } => {
            cmd_import(input.clone(), &pe_dir);
            return;
        },
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            return;
        },
        _ => {}
    }

    // For all other commands, determine the project file to use: an explicit
    // --db path, the most recently modified project, or a fresh default.
    let db_path = cli.db.unwrap_or_else(|| {
        match get_most_recent_project(&pe_dir) {
            Ok(Some(stored)) => stored.file_path,
            _ => match create_project("Default", &pe_dir) {
                Ok((stored, _)) => stored.file_path,
                Err(e) => {
                    eprintln!("Failed to create default project: {e}");
                    std::process::exit(1);
                }
            },
        }
    });

    let mut project = match load_project(&db_path) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Failed to load project {}: {e}", db_path.display());
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::New { .. } => unreachable!("New command handled above"),
        Commands::Projects => unreachable!("Projects command handled above"),
        Commands::Delete { .. } => unreachable!("Delete command handled above"),
        Commands::Import { .. } => unreachable!("Import command handled above"),
        Commands::Completions { .. } => unreachable!("Completions command handled above"),

        Commands::Summary => cmd_summary(&mut project),

        Commands::Analytics => cmd_analytics(&mut project),

        Commands::Set {
            name, requirements, requirements_file, effort_multiplier, hourly_rate, fixed_costs,
        } => cmd_set(&mut project, &db_path, name, requirements, requirements_file,
                     effort_multiplier, hourly_rate, fixed_costs),

        Commands::Module { action } => cmd_module(&mut project, &db_path, action),

        Commands::Task { action } => cmd_task(&mut project, &db_path, action),

        Commands::Risk { action } => cmd_risk(&mut project, &db_path, action),

        Commands::Dep { action } => cmd_dep(&mut project, &db_path, action),

        Commands::CriticalPath => cmd_critical_path(&mut project),

        Commands::Progress => cmd_progress(&mut project),

        Commands::Plan { action } => cmd_plan(&mut project, &db_path, action),

        Commands::Export { output } => cmd_export(&mut project, output),
    }
}
