/// Shared loading and error plumbing for the ordered keyword and synonym
/// tables.
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

use crate::schema::mood::Mood;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid word pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("mood '{0}' appears more than once")]
    DuplicateMood(Mood),
    #[error("mood '{0}' has no keywords")]
    EmptyKeywordList(Mood),
    #[error("mood '{0}' has an empty keyword")]
    EmptyKeyword(Mood),
    #[error("keyword '{keyword}' for mood '{mood}' is not lowercase")]
    KeywordNotLowercase { mood: Mood, keyword: String },
    #[error("canonical word '{0}' must be a single non-empty word")]
    InvalidCanonical(String),
    #[error("canonical word '{0}' appears more than once")]
    DuplicateCanonical(String),
    #[error("canonical word '{0}' has no candidates")]
    NoCandidates(String),
    #[error("first candidate of '{0}' must be the word itself")]
    CanonicalNotFirst(String),
}

/// Read and deserialize a RON table file.
pub(crate) fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, TableError> {
    let contents = std::fs::read_to_string(path)?;
    let table = ron::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "loaded table");
    Ok(table)
}
