use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::TreeFile;
use crate::model::store::StructuralError;

pub const DEFINITION_FILE: &str = "preftree.toml";

/// Error type for loading a tree definition
#[derive(Debug, thiserror::Error)]
pub enum DeclError {
    #[error("not a preftree definition: no preftree.toml found")]
    NotADefinition,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse preftree.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid tree: {0}")]
    Structural(#[from] StructuralError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A loaded definition directory
#[derive(Debug, Clone)]
pub struct Definition {
    pub root: PathBuf,
    pub file: TreeFile,
}

impl Definition {
    /// Path of the persisted open/closed state
    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.file.settings.state_file)
    }
}

/// Walk up from `start` looking for a directory holding preftree.toml.
pub fn discover_definition(start: &Path) -> Result<PathBuf, DeclError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DEFINITION_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(DeclError::NotADefinition);
        }
    }
}

/// Read and parse preftree.toml from `root`.
pub fn load_definition(root: &Path) -> Result<Definition, DeclError> {
    let path = root.join(DEFINITION_FILE);
    if !path.is_file() {
        return Err(DeclError::NotADefinition);
    }
    let text = fs::read_to_string(&path).map_err(|e| DeclError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let file: TreeFile = toml::from_str(&text)?;
    Ok(Definition {
        root: root.to_path_buf(),
        file,
    })
}
