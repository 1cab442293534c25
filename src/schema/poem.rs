use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported poem file format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// A single poem as shown by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    pub title: String,
    pub lines: Vec<String>,
}

impl Poem {
    pub fn new(title: impl Into<String>, lines: &[&str]) -> Self {
        Self {
            title: title.into(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The line kept on screen while the poem fades out of the history.
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}

/// The full collection of poems the oracle draws from.
///
/// Serialized as a bare list, so a `poems.json` file is simply
/// `[{ "title": ..., "lines": [...] }, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoemBook {
    pub poems: Vec<Poem>,
}

impl PoemBook {
    pub fn new(poems: Vec<Poem>) -> Self {
        Self { poems }
    }

    /// Load a poem book, choosing the parser from the file extension
    /// (`.json` or `.ron`).
    pub fn load(path: &Path) -> Result<PoemBook, PoemError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let contents = match extension.as_deref() {
            Some("json") | Some("ron") => std::fs::read_to_string(path)?,
            _ => return Err(PoemError::UnsupportedFormat(path.to_path_buf())),
        };
        let book = if extension.as_deref() == Some("json") {
            Self::parse_json(&contents)?
        } else {
            Self::parse_ron(&contents)?
        };
        tracing::debug!(path = %path.display(), poems = book.len(), "loaded poem book");
        Ok(book)
    }

    pub fn parse_json(input: &str) -> Result<PoemBook, PoemError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn parse_ron(input: &str) -> Result<PoemBook, PoemError> {
        Ok(ron::from_str(input)?)
    }

    /// Append all poems from `other`, keeping their order.
    pub fn merge(&mut self, other: PoemBook) {
        self.poems.extend(other.poems);
    }

    pub fn len(&self) -> usize {
        self.poems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poems.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Poem> {
        self.poems.get(index)
    }

    /// Pick a poem uniformly at random. `None` for an empty book.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<&Poem> {
        if self.poems.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.poems.len());
        self.poems.get(index)
    }
}
