//! Seed the states lookup table from YAML.
//!
//! ```yaml
//! states:
//!   - title: Johor
//!     code: JHR
//!     flag: https://cdn.myngo.0o0.my/flags/johor.png
//!   - title: Labuan
//!     code: LBN
//!     active: false
//! ```
//!
//! Rows are upserted by `code`, so the command can be re-run after editing
//! the file.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use myngo_api::db::{self, StateRepository};
use myngo_api::models::StateRecord;

/// Contents of a states seed file.
#[derive(Debug, Deserialize)]
pub struct StatesFile {
    pub states: Vec<SeedState>,
}

/// One state entry.
#[derive(Debug, Deserialize)]
pub struct SeedState {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// A problem found in a seed file before touching the database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("entry {0}: title is empty")]
    EmptyTitle(usize),
    #[error("entry {0}: code is empty")]
    EmptyCode(usize),
    #[error("entry {0}: duplicate code '{1}'")]
    DuplicateCode(usize, String),
}

/// Check every entry, collecting all problems.
#[must_use]
pub fn validate(file: &StatesFile) -> Vec<SeedError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, state) in file.states.iter().enumerate() {
        let entry = index + 1;
        if state.title.trim().is_empty() {
            errors.push(SeedError::EmptyTitle(entry));
        }
        let code = state.code.trim();
        if code.is_empty() {
            errors.push(SeedError::EmptyCode(entry));
        } else if !seen.insert(code.to_owned()) {
            errors.push(SeedError::DuplicateCode(entry, code.to_owned()));
        }
    }

    errors
}

/// Upsert states from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn states(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading states from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let file: StatesFile = serde_yaml::from_str(&content)?;

    let errors = validate(&file);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = StateRepository::new(&pool);
    for state in &file.states {
        let record = StateRecord {
            title: state.title.trim().to_owned(),
            code: state.code.trim().to_owned(),
            flag: state.flag.clone(),
        };
        repo.upsert(&record, state.active).await?;
    }

    info!(states = file.states.len(), "States seeded");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let file: StatesFile = serde_yaml::from_str(
            "states:\n  - title: Johor\n    code: JHR\n  - title: Labuan\n    code: LBN\n    active: false\n",
        )
        .unwrap();

        assert_eq!(file.states.len(), 2);
        assert!(file.states[0].active);
        assert_eq!(file.states[0].flag, None);
        assert!(!file.states[1].active);
        assert!(validate(&file).is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let file: StatesFile = serde_yaml::from_str(
            "states:\n  - title: Johor\n    code: JHR\n  - title: ' '\n    code: JHR\n  - title: Kedah\n    code: ''\n",
        )
        .unwrap();

        assert_eq!(
            validate(&file),
            [
                SeedError::EmptyTitle(2),
                SeedError::DuplicateCode(2, "JHR".to_string()),
                SeedError::EmptyCode(3),
            ]
        );
    }
}
