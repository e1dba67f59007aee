//! Enumerations and field types for estimation records.
//!
//! This module defines the structured data types used to classify tasks and risks,
//! including time units, work categories, task status values, and risk levels.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit in which a raw time estimate is entered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TimeUnit {
    #[serde(alias = "Minutes")]
    Minutes,
    #[serde(alias = "Hours")]
    Hours,
    #[serde(alias = "Days")]
    Days,
}

/// Work category a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    #[serde(alias = "Design")]
    Design,
    #[serde(alias = "Development (Frontend)", alias = "Development-Frontend")]
    DevelopmentFrontend,
    #[serde(alias = "Development (Backend)", alias = "Development-Backend")]
    DevelopmentBackend,
    #[serde(alias = "API Development")]
    ApiDevelopment,
    #[serde(alias = "Database")]
    Database,
    #[serde(alias = "Testing/QA", alias = "Testing-QA")]
    TestingQa,
    #[serde(alias = "Deployment")]
    Deployment,
    #[serde(alias = "Management")]
    Management,
    #[serde(alias = "Documentation")]
    Documentation,
    #[serde(alias = "Research")]
    Research,
    #[serde(alias = "Communication")]
    Communication,
    #[serde(alias = "Other")]
    Other,
}

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// Probability or impact rating on the three-point risk scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

/// Severity band derived from a risk priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}
