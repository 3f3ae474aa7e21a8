//! Per-module load outcomes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded,
    Failed { reason: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded)
    }
}

/// A declared module and what happened when it was loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutcome {
    /// Declared base name
    pub name: String,

    /// Platform file name derived from the base name
    pub file_name: String,

    #[serde(flatten)]
    pub status: LoadStatus,

    /// When the load was attempted
    pub attempted_at: DateTime<Utc>,
}

/// Outcomes of a loader run, in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Directory registered with the platform loader, if any
    pub search_directory: Option<PathBuf>,

    outcomes: Vec<ModuleOutcome>,
}

impl LoadReport {
    pub(crate) fn push(&mut self, outcome: ModuleOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes in load order.
    pub fn outcomes(&self) -> &[ModuleOutcome] {
        &self.outcomes
    }

    /// Outcome for a declared base name.
    pub fn get(&self, name: &str) -> Option<&ModuleOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.get(name).is_some_and(|outcome| outcome.status.is_loaded())
    }

    pub fn loaded(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.status.is_loaded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.status.is_loaded())
    }

    /// True when no declared module failed.
    pub fn all_loaded(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
