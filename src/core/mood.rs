/// Mood classifier: maps free text to a `Mood` by keyword containment.
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::table::{load_ron, TableError};
use crate::schema::mood::Mood;

/// Built-in trigger words, in detection order.
const BUILTIN_KEYWORDS: &[(Mood, &[&str])] = &[
    (
        Mood::Calm,
        &["peace", "calm", "quiet", "still", "breathe", "rest", "gentle", "soft"],
    ),
    (
        Mood::Melancholy,
        &["sad", "lonely", "lost", "miss", "gone", "empty", "tears", "sorrow", "grief"],
    ),
    (
        Mood::Hopeful,
        &["hope", "future", "tomorrow", "dream", "wish", "light", "dawn", "new", "begin"],
    ),
    (
        Mood::Mysterious,
        &["mystery", "secret", "hidden", "shadow", "unknown", "dark", "night", "moon"],
    ),
    (
        Mood::Joyful,
        &["joy", "happy", "love", "laugh", "bright", "smile", "celebrate", "beautiful"],
    ),
    (
        Mood::Introspective,
        &["think", "wonder", "question", "why", "meaning", "self", "soul", "truth"],
    ),
];

/// One row of a keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub mood: Mood,
    pub keywords: Vec<String>,
}

/// Ordered mood → keywords table. Row order is the tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable {
    pub entries: Vec<KeywordEntry>,
}

/// A keyword that can never decide the mood because a keyword of an
/// earlier row is a substring of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedKeyword {
    pub mood: Mood,
    pub keyword: String,
    pub shadowed_by: Mood,
    pub shadowing_keyword: String,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordTable {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_KEYWORDS
                .iter()
                .map(|(mood, words)| KeywordEntry {
                    mood: *mood,
                    keywords: words.iter().map(|w| w.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Load a keyword table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<KeywordTable, TableError> {
        let table: KeywordTable = load_ron(path)?;
        table.validate()?;
        Ok(table)
    }

    /// Parse a keyword table from a RON string.
    pub fn parse_ron(input: &str) -> Result<KeywordTable, TableError> {
        let table: KeywordTable = ron::from_str(input)?;
        table.validate()?;
        Ok(table)
    }

    /// Reject tables whose matching behaviour would be surprising:
    /// repeated moods, empty rows, empty or non-lowercase keywords.
    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = FxHashSet::default();
        for entry in &self.entries {
            if !seen.insert(entry.mood) {
                return Err(TableError::DuplicateMood(entry.mood));
            }
            if entry.keywords.is_empty() {
                return Err(TableError::EmptyKeywordList(entry.mood));
            }
            for keyword in &entry.keywords {
                if keyword.is_empty() {
                    return Err(TableError::EmptyKeyword(entry.mood));
                }
                if keyword.to_lowercase() != *keyword {
                    return Err(TableError::KeywordNotLowercase {
                        mood: entry.mood,
                        keyword: keyword.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Keywords that are unreachable because an earlier row always
    /// matches first.
    pub fn shadowed(&self) -> Vec<ShadowedKeyword> {
        let mut found = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            for keyword in &entry.keywords {
                let shadow = self.entries[..i].iter().find_map(|earlier| {
                    earlier
                        .keywords
                        .iter()
                        .find(|k| keyword.contains(k.as_str()))
                        .map(|k| (earlier.mood, k.clone()))
                });
                if let Some((shadowed_by, shadowing_keyword)) = shadow {
                    found.push(ShadowedKeyword {
                        mood: entry.mood,
                        keyword: keyword.clone(),
                        shadowed_by,
                        shadowing_keyword,
                    });
                }
            }
        }
        found
    }
}

static BUILTIN_DETECTOR: Lazy<MoodDetector> = Lazy::new(MoodDetector::default);

/// Classifies input text against a keyword table.
#[derive(Debug, Clone, Default)]
pub struct MoodDetector {
    table: KeywordTable,
}

impl MoodDetector {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    /// Shared detector over the built-in keyword table.
    pub fn builtin() -> &'static MoodDetector {
        &BUILTIN_DETECTOR
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// First mood (in table order) with a keyword contained in the
    /// lowercased input; `Mood::Mysterious` when nothing matches.
    pub fn detect(&self, input: &str) -> Mood {
        let normalized = input.to_lowercase();
        let mood = self
            .table
            .entries
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|keyword| normalized.contains(keyword.as_str()))
            })
            .map(|entry| entry.mood)
            .unwrap_or_default();
        tracing::trace!(%mood, "detected mood");
        mood
    }
}

/// Detect the mood of `input` using the built-in keyword table.
pub fn detect_mood(input: &str) -> Mood {
    MoodDetector::builtin().detect(input)
}
