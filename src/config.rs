// src/config.rs

use std::str::FromStr;

use clap::Parser;
use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::error::DatasetError;
use crate::locator::{ExecutionMode, DATASET_FILE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModeKind {
    Local,
    Hosted,
}

#[derive(Parser, Debug)]
#[command(name = "penguinview")]
#[command(version, about = "Browse the penguins dataset in a table and a chart explorer", long_about = None)]
pub struct Cli {
    /// Execution mode: `local` or `hosted`
    #[arg(short, long, default_value = "local")]
    pub mode: String,

    /// Where the notebook is served from (required in hosted mode)
    #[arg(long)]
    pub notebook_root: Option<String>,

    /// Dataset file name
    #[arg(short, long, default_value = DATASET_FILE)]
    pub file: String,

    /// Title shown above the viewers
    #[arg(long, default_value = "Palmer penguins")]
    pub title: String,

    /// Print a summary of the dataset instead of opening the viewer
    #[arg(long)]
    pub print: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    pub fn execution_mode(&self) -> Result<ExecutionMode, DatasetError> {
        execution_mode(&self.mode, self.notebook_root.as_deref())
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

/// Selects the execution mode once, from explicit parameters.
pub fn execution_mode(mode: &str, notebook_root: Option<&str>) -> Result<ExecutionMode, DatasetError> {
    let kind = ModeKind::from_str(mode.trim()).map_err(|_| {
        DatasetError::UnsupportedEnvironment(format!(
            "unknown mode '{}', expected '{}' or '{}'",
            mode,
            ModeKind::Local,
            ModeKind::Hosted
        ))
    })?;

    match (kind, notebook_root) {
        (ModeKind::Local, Some(root)) => {
            warn!(root, "ignoring --notebook-root in local mode");
            Ok(ExecutionMode::Local)
        }
        (ModeKind::Local, None) => Ok(ExecutionMode::Local),
        (ModeKind::Hosted, Some(root)) => Ok(ExecutionMode::Hosted {
            notebook_root: root.to_string(),
        }),
        (ModeKind::Hosted, None) => Err(DatasetError::UnsupportedEnvironment(
            "hosted mode requires --notebook-root".to_string(),
        )),
    }
}
