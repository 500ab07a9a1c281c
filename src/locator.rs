// src/locator.rs

//! Resolves where the dataset lives for the current execution mode.
//!
//! A local run reads a bare file name from the working directory. A hosted
//! run (a static site executed in the browser) reads the copy published under
//! `public/` next to the notebook itself.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::DatasetError;

pub const DATASET_FILE: &str = "penguins.csv";
pub const PUBLISHED_ASSETS_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    Local,
    /// `notebook_root` is where the running notebook is served from: an
    /// http(s) URL or a filesystem root.
    Hosted { notebook_root: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    File(PathBuf),
    Url(String),
}

impl DatasetLocation {
    pub fn extension(&self) -> Option<&str> {
        match self {
            DatasetLocation::File(path) => path.extension().and_then(|ext| ext.to_str()),
            DatasetLocation::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                let name = path.rsplit('/').next()?;
                Path::new(name).extension().and_then(|ext| ext.to_str())
            }
        }
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetLocation::File(path) => write!(f, "{}", path.display()),
            DatasetLocation::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetLocator {
    mode: ExecutionMode,
    file_name: String,
}

impl DatasetLocator {
    pub fn new(mode: ExecutionMode) -> Self {
        DatasetLocator {
            mode,
            file_name: DATASET_FILE.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn mode(&self) -> &ExecutionMode {
        &self.mode
    }

    /// Path of the dataset relative to the mode's base location.
    pub fn relative_path(&self) -> String {
        match self.mode {
            ExecutionMode::Local => self.file_name.clone(),
            ExecutionMode::Hosted { .. } => format!("{}/{}", PUBLISHED_ASSETS_DIR, self.file_name),
        }
    }

    pub fn resolve(&self) -> Result<DatasetLocation, DatasetError> {
        let location = match &self.mode {
            ExecutionMode::Local => DatasetLocation::File(PathBuf::from(&self.file_name)),
            ExecutionMode::Hosted { notebook_root } => self.resolve_hosted(notebook_root)?,
        };
        info!(mode = ?self.mode, %location, "resolved dataset location");
        Ok(location)
    }

    fn resolve_hosted(&self, notebook_root: &str) -> Result<DatasetLocation, DatasetError> {
        let root = notebook_root.trim();
        if root.is_empty() {
            return Err(DatasetError::UnsupportedEnvironment(
                "hosted mode requires a notebook root".to_string(),
            ));
        }

        match root.split_once("://") {
            Some((scheme, rest)) if is_http(scheme) => {
                if rest.trim_start_matches('/').is_empty() {
                    return Err(DatasetError::UnsupportedEnvironment(format!(
                        "notebook root '{}' has no host",
                        root
                    )));
                }
                let root = root.trim_end_matches('/');
                Ok(DatasetLocation::Url(format!("{}/{}", root, self.relative_path())))
            }
            Some((scheme, _)) => Err(DatasetError::UnsupportedEnvironment(format!(
                "notebook root scheme '{}' cannot serve assets",
                scheme
            ))),
            None => Ok(DatasetLocation::File(
                Path::new(root)
                    .join(PUBLISHED_ASSETS_DIR)
                    .join(&self.file_name),
            )),
        }
    }
}

fn is_http(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}
