use crate::compare::ComparisonResult;
use crate::summary::PatternSummary;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io { path: path.to_path_buf(), source }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Json { path: path.to_path_buf(), source }
    }
}

pub fn load_summary(path: &Path) -> Result<PatternSummary, StoreError> {
    load_json(path)
}

/// The previous period's summary; a missing file means this is the first run.
pub fn load_summary_or_empty(path: &Path) -> Result<PatternSummary, StoreError> {
    if !path.exists() {
        info!(path = %path.display(), "no previous summary; comparing against an empty one");
        return Ok(PatternSummary::default());
    }
    load_summary(path)
}

pub fn save_summary(summary: &PatternSummary, path: &Path) -> Result<(), StoreError> {
    save_json(summary, path)
}

pub fn save_comparison(result: &ComparisonResult, path: &Path) -> Result<(), StoreError> {
    save_json(result, path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::json(path, e))
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(path, e))?;
    }
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| StoreError::json(path, e))?;
    writer.write_all(b"\n").map_err(|e| StoreError::io(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    info!(path = %path.display(), "saved");
    Ok(())
}
