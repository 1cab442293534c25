/// Living-poem variation: seeded whole-word synonym substitution.
///
/// The substitution itself is a pure function of the line and a seed in
/// `[0, 1)`. Randomness only enters through the caller's RNG, both for the
/// seed and for the 30% gate deciding whether a poem varies at all.
use once_cell::sync::Lazy;
use rand::Rng;
use regex::{NoExpand, Regex};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::table::{load_ron, TableError};
use crate::schema::poem::Poem;

/// Probability that a freshly chosen poem gets varied.
pub const VARIATION_CHANCE: f64 = 0.3;

/// Built-in synonyms, in substitution order. The first candidate of each
/// row is the canonical word itself.
const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("stars", &["stars", "celestial lights", "distant suns", "cosmic embers"]),
    ("secrets", &["secrets", "mysteries", "whispers", "hidden truths"]),
    ("silence", &["silence", "stillness", "quiet", "hush"]),
    ("darkness", &["darkness", "shadow", "night", "void"]),
    ("dreams", &["dreams", "visions", "reveries", "fantasies"]),
    ("sunlight", &["sunlight", "golden rays", "dawn light", "morning glow"]),
    ("moon", &["moon", "lunar orb", "night eye", "silver sentinel"]),
    ("melody", &["melody", "song", "tune", "harmony"]),
    ("heartbeats", &["heartbeats", "pulses", "rhythms", "life drums"]),
    ("oracle", &["oracle", "seer", "mystic", "sage"]),
    ("sky", &["sky", "heavens", "firmament", "celestial canvas"]),
];

static BUILTIN_VARIATOR: Lazy<Variator> = Lazy::new(|| {
    Variator::new(SynonymTable::builtin()).expect("built-in synonym table compiles")
});

/// One row of a synonym table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub word: String,
    pub candidates: Vec<String>,
}

/// Ordered canonical word → candidates table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    pub entries: Vec<SynonymEntry>,
}

/// A candidate that contains a canonical word handled later in the table,
/// so choosing it triggers a second substitution in the same call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedCandidate {
    pub word: String,
    pub candidate: String,
    pub feeds: String,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SynonymTable {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_SYNONYMS
                .iter()
                .map(|(word, candidates)| SynonymEntry {
                    word: word.to_string(),
                    candidates: candidates.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Load a synonym table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<SynonymTable, TableError> {
        let table: SynonymTable = load_ron(path)?;
        table.validate()?;
        Ok(table)
    }

    /// Parse a synonym table from a RON string.
    pub fn parse_ron(input: &str) -> Result<SynonymTable, TableError> {
        let table: SynonymTable = ron::from_str(input)?;
        table.validate()?;
        Ok(table)
    }

    /// Canonical words must be single word tokens, unique ignoring case,
    /// and listed as their own first candidate.
    pub fn validate(&self) -> Result<(), TableError> {
        let mut seen = FxHashSet::default();
        for entry in &self.entries {
            let is_token = !entry.word.is_empty()
                && entry
                    .word
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !is_token {
                return Err(TableError::InvalidCanonical(entry.word.clone()));
            }
            if !seen.insert(entry.word.to_ascii_lowercase()) {
                return Err(TableError::DuplicateCanonical(entry.word.clone()));
            }
            match entry.candidates.first() {
                None => return Err(TableError::NoCandidates(entry.word.clone())),
                Some(first) if !first.eq_ignore_ascii_case(&entry.word) => {
                    return Err(TableError::CanonicalNotFirst(entry.word.clone()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Candidates whose text will be re-matched by a later row.
    pub fn chains(&self) -> Result<Vec<ChainedCandidate>, TableError> {
        let patterns = self
            .entries
            .iter()
            .map(|entry| word_pattern(&entry.word))
            .collect::<Result<Vec<_>, _>>()?;

        let mut found = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            for candidate in &entry.candidates {
                let later = self.entries[i + 1..]
                    .iter()
                    .zip(&patterns[i + 1..])
                    .find(|(_, pattern)| pattern.is_match(candidate));
                if let Some((feeds, _)) = later {
                    found.push(ChainedCandidate {
                        word: entry.word.clone(),
                        candidate: candidate.clone(),
                        feeds: feeds.word.clone(),
                    });
                }
            }
        }
        Ok(found)
    }
}

/// Case-insensitive whole-word matcher with ASCII word boundaries.
fn word_pattern(word: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i-u)\b{}\b", regex::escape(word)))
}

/// `floor(seed * count) mod count`, reduced into range for any seed.
pub fn candidate_index(seed: f64, count: usize) -> usize {
    if count == 0 || !seed.is_finite() {
        return 0;
    }
    let raw = (seed * count as f64).floor() as i64;
    raw.rem_euclid(count as i64) as usize
}

#[derive(Debug, Clone)]
struct CompiledSynonym {
    word: String,
    pattern: Regex,
    candidates: Vec<String>,
}

/// A synonym table compiled into whole-word matchers.
#[derive(Debug, Clone)]
pub struct Variator {
    entries: Vec<CompiledSynonym>,
}

impl Variator {
    pub fn new(table: SynonymTable) -> Result<Self, TableError> {
        table.validate()?;
        let entries = table
            .entries
            .into_iter()
            .map(|entry| {
                Ok(CompiledSynonym {
                    pattern: word_pattern(&entry.word)?,
                    word: entry.word,
                    candidates: entry.candidates,
                })
            })
            .collect::<Result<Vec<_>, TableError>>()?;
        Ok(Self { entries })
    }

    /// The shared variator over the built-in table.
    pub fn builtin() -> &'static Variator {
        &BUILTIN_VARIATOR
    }

    /// Canonical words in substitution order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.word.as_str())
    }

    /// Substitute every canonical word present in `line`.
    ///
    /// Rows are applied in table order against the line as modified so
    /// far. All occurrences of one word receive the same candidate.
    pub fn vary_line(&self, line: &str, seed: f64) -> String {
        let mut varied = line.to_string();
        for entry in &self.entries {
            if !entry.pattern.is_match(&varied) {
                continue;
            }
            let candidate = &entry.candidates[candidate_index(seed, entry.candidates.len())];
            tracing::trace!(word = %entry.word, %candidate, "substituting");
            varied = entry
                .pattern
                .replace_all(&varied, NoExpand(candidate))
                .into_owned();
        }
        varied
    }

    pub fn vary_lines<S: AsRef<str>>(&self, lines: &[S], seed: f64) -> Vec<String> {
        lines
            .iter()
            .map(|line| self.vary_line(line.as_ref(), seed))
            .collect()
    }

    /// A copy of `poem` with every line varied using the same seed.
    pub fn vary_poem(&self, poem: &Poem, seed: f64) -> Poem {
        Poem {
            title: poem.title.clone(),
            lines: self.vary_lines(&poem.lines, seed),
        }
    }

    /// True if any canonical word occurs in any of the lines.
    pub fn can_vary<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        lines.iter().any(|line| {
            self.entries
                .iter()
                .any(|entry| entry.pattern.is_match(line.as_ref()))
        })
    }
}

/// Vary `line` with the built-in synonym table.
pub fn vary_line(line: &str, seed: f64) -> String {
    Variator::builtin().vary_line(line, seed)
}

/// Draw the variation gate with probability `chance`.
pub fn should_vary_at<R: Rng>(rng: &mut R, chance: f64) -> bool {
    rng.gen::<f64>() < chance
}

/// Draw the 30% variation gate from `rng`.
pub fn should_vary_with<R: Rng>(rng: &mut R) -> bool {
    should_vary_at(rng, VARIATION_CHANCE)
}

/// Draw the 30% variation gate from the thread-local RNG.
pub fn should_vary() -> bool {
    should_vary_with(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn plain_line_unchanged() {
        for seed in [0.0, 0.25, 0.5, 0.99] {
            assert_eq!(vary_line("a plain sentence", seed), "a plain sentence");
        }
    }

    #[test]
    fn whole_word_only() {
        assert_eq!(vary_line("starship stars", 0.0), "starship stars");
        assert_eq!(vary_line("starship stars", 0.3), "starship celestial lights");
        assert_eq!(vary_line("skyline", 0.9), "skyline");
    }

    #[test]
    fn seed_zero_is_identity_for_builtin() {
        let line = "The oracle hums a melody under the moon and stars";
        assert_eq!(vary_line(line, 0.0), line);
    }

    #[test]
    fn every_occurrence_gets_same_candidate() {
        assert_eq!(
            vary_line("stars above, Stars below, STARS within", 0.5),
            "distant suns above, distant suns below, distant suns within"
        );
    }

    #[test]
    fn case_insensitive_match_literal_replacement() {
        // the candidate text is inserted as written, not case-adjusted
        assert_eq!(vary_line("Silence falls", 0.75), "hush falls");
    }

    #[test]
    fn multiple_words_share_the_seed() {
        assert_eq!(
            vary_line("the moon guards her secrets", 0.25),
            "the lunar orb guards her mysteries"
        );
    }

    #[test]
    fn punctuation_is_a_boundary() {
        assert_eq!(vary_line("sky, sky; sky.", 0.5), "firmament, firmament; firmament.");
    }

    #[test]
    fn candidate_index_in_range() {
        assert_eq!(candidate_index(0.0, 4), 0);
        assert_eq!(candidate_index(0.24, 4), 0);
        assert_eq!(candidate_index(0.25, 4), 1);
        assert_eq!(candidate_index(0.999, 4), 3);
        assert_eq!(candidate_index(1.0, 4), 0);
        assert_eq!(candidate_index(1.5, 4), 2);
        assert_eq!(candidate_index(-0.25, 4), 3);
        assert_eq!(candidate_index(f64::NAN, 4), 0);
        assert_eq!(candidate_index(f64::INFINITY, 4), 0);
        assert_eq!(candidate_index(0.5, 0), 0);
    }

    #[test]
    fn out_of_range_seed_does_not_panic() {
        assert_eq!(vary_line("stars", -0.25), "cosmic embers");
        assert_eq!(vary_line("stars", 7.0), "stars");
        assert_eq!(vary_line("stars", f64::NAN), "stars");
    }

    #[test]
    fn chained_substitution_is_preserved() {
        let table = SynonymTable::parse_ron(
            r#"[
                (word: "night", candidates: ["night", "darkness"]),
                (word: "darkness", candidates: ["darkness", "void"]),
            ]"#,
        )
        .unwrap();
        let variator = Variator::new(table.clone()).unwrap();
        assert_eq!(variator.vary_line("the night", 0.5), "the void");
        assert_eq!(variator.vary_line("the night", 0.0), "the night");

        let chains = table.chains().unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].candidate, "darkness");
        assert_eq!(chains[0].feeds, "darkness");
    }

    #[test]
    fn builtin_table_valid_and_unchained() {
        let table = SynonymTable::builtin();
        assert_eq!(table.entries.len(), 11);
        table.validate().unwrap();
        assert!(table.chains().unwrap().is_empty());
        assert_eq!(Variator::builtin().words().next(), Some("stars"));
    }

    #[test]
    fn validate_rejects_bad_rows() {
        let not_first = SynonymTable::parse_ron(r#"[(word: "sky", candidates: ["heavens", "sky"])]"#);
        assert!(matches!(not_first, Err(TableError::CanonicalNotFirst(_))));

        let empty = SynonymTable::parse_ron(r#"[(word: "sky", candidates: [])]"#);
        assert!(matches!(empty, Err(TableError::NoCandidates(_))));

        let phrase = SynonymTable::parse_ron(r#"[(word: "night sky", candidates: ["night sky"])]"#);
        assert!(matches!(phrase, Err(TableError::InvalidCanonical(_))));

        let duplicate = SynonymTable::parse_ron(
            r#"[
                (word: "sky", candidates: ["sky"]),
                (word: "Sky", candidates: ["Sky"]),
            ]"#,
        );
        assert!(matches!(duplicate, Err(TableError::DuplicateCanonical(_))));
    }

    #[test]
    fn vary_poem_keeps_title() {
        let poem = Poem::new("Stars", &["stars and sky", "no change here"]);
        let varied = Variator::builtin().vary_poem(&poem, 0.5);
        assert_eq!(varied.title, "Stars");
        assert_eq!(varied.lines, vec!["distant suns and firmament", "no change here"]);
    }

    #[test]
    fn can_vary_detects_canonical_words() {
        let variator = Variator::builtin();
        assert!(variator.can_vary(&["under the Sky"]));
        assert!(!variator.can_vary(&["starship", "skyline"]));
    }

    #[test]
    fn should_vary_rate_near_thirty_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let hits = (0..10_000).filter(|_| should_vary_with(&mut rng)).count();
        assert!(
            (2_700..=3_300).contains(&hits),
            "expected roughly 3000 of 10000, got {hits}"
        );
    }

    #[test]
    fn should_vary_unseeded_is_usable() {
        let hits = (0..10_000).filter(|_| should_vary()).count();
        assert!((2_500..=3_500).contains(&hits), "got {hits}");
    }

    #[test]
    fn should_vary_at_extremes() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!((0..100).all(|_| !should_vary_at(&mut rng, 0.0)));
        assert!((0..100).all(|_| should_vary_at(&mut rng, 1.0)));
    }
}
