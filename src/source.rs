//! Document records read from JSON lines, one search-index hit per line.

use crate::miner::RawMessage;
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;
use thiserror::Error;
use tracing::{info, warn};

const UNKNOWN: &str = "unknown";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("line {line}: invalid document JSON: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read documents: {0}")]
    Io(#[from] std::io::Error),
}

/// Either the flattened `{index, id, message}` shape or a raw hit with
/// `_index`, `_id` and `_source.message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentRecord {
    #[serde(default, alias = "_index")]
    pub index: Option<Value>,
    #[serde(default, alias = "_id")]
    pub id: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "_source")]
    pub source: Option<SourceFields>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceFields {
    #[serde(default)]
    pub message: Option<String>,
}

impl DocumentRecord {
    /// `<index>:<id>`, with `unknown` standing in for a missing part.
    pub fn origin_reference(&self) -> String {
        format!("{}:{}", reference_part(self.index.as_ref()), reference_part(self.id.as_ref()))
    }

    /// Message text, or `None` when the record carries none.
    pub fn into_raw_message(self) -> Option<RawMessage> {
        let origin_reference = self.origin_reference();
        let text = self
            .message
            .or_else(|| self.source.and_then(|s| s.message))
            .filter(|m| !m.is_empty())?;
        Some(RawMessage { origin_reference, text })
    }
}

/// Strings as they are, other JSON values in their JSON form.
fn reference_part(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => UNKNOWN.to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn parse_document_line(line: &str, line_number: usize) -> Result<Option<RawMessage>, SourceError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let record: DocumentRecord = serde_json::from_str(trimmed)
        .map_err(|source| SourceError::InvalidLine { line: line_number, source })?;
    Ok(record.into_raw_message())
}

/// Reads every document with message text. Lines that are not valid JSON are
/// logged and skipped; only I/O failures abort.
pub fn read_documents<R: BufRead>(reader: R) -> Result<Vec<RawMessage>, SourceError> {
    let mut out = Vec::new();
    let mut invalid = 0usize;
    let mut without_text = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_document_line(&line, idx + 1) {
            Ok(Some(message)) => out.push(message),
            Ok(None) => without_text += 1,
            Err(e) => {
                warn!(error = %e, "skipping invalid document line");
                invalid += 1;
            }
        }
    }
    info!(documents = out.len(), invalid, without_text, "read documents");
    Ok(out)
}
