/// The oracle session: input → mood, ask → poem, plus the fading history
/// and display state the UI renders from.
///
/// All randomness (poem choice, variation gate and seed, visual effect)
/// comes from one seeded `StdRng`, so a session replays exactly for a
/// given seed and sequence of calls.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::core::mood::{KeywordTable, MoodDetector};
use crate::core::table::TableError;
use crate::core::variation::{should_vary_at, SynonymTable, Variator, VARIATION_CHANCE};
use crate::schema::mood::{Mood, MoodTheme};
use crate::schema::poem::{Poem, PoemBook, PoemError};

/// How long the UI lets the current poem fade before asking again.
pub const FADE_OUT_MS: u64 = 600;
/// Interval between history fade ticks.
pub const HISTORY_TICK_MS: u64 = 100;

const HISTORY_START_OPACITY: f64 = 0.4;
const HISTORY_FADE_STEP: f64 = 0.02;
/// Ticks until a memory has faded out completely (0.4 / 0.02).
const HISTORY_LIFETIME_TICKS: u32 = 20;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("poem error: {0}")]
    Poem(#[from] PoemError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("variation chance must be within 0..=1, got {0}")]
    InvalidVariationChance(f64),
}

/// Decorative effect shown alongside a poem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualEffect {
    Sparkles,
    Ink,
    Stars,
}

impl VisualEffect {
    pub const ALL: [VisualEffect; 3] = [Self::Sparkles, Self::Ink, Self::Stars];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sparkles => "sparkles",
            Self::Ink => "ink",
            Self::Stars => "stars",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Standard,
    Constellation,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Standard => Self::Constellation,
            Self::Constellation => Self::Standard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Constellation => "constellation",
        }
    }
}

/// A previously shown poem lingering faintly in the background.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoemMemory {
    pub id: u64,
    pub poem: Poem,
    age: u32,
}

impl PoemMemory {
    pub fn opacity(&self) -> f64 {
        (HISTORY_START_OPACITY - HISTORY_FADE_STEP * self.age as f64).max(0.0)
    }

    fn faded(&self) -> bool {
        self.age >= HISTORY_LIFETIME_TICKS
    }
}

pub struct Oracle {
    poems: PoemBook,
    detector: MoodDetector,
    variator: Variator,
    variation_chance: f64,
    rng: StdRng,
    input: String,
    mood: Mood,
    current: Option<Poem>,
    history: Vec<PoemMemory>,
    next_memory_id: u64,
    visual_effect: VisualEffect,
    view_mode: ViewMode,
    fading_out: bool,
    last_variation_seed: Option<f64>,
}

/// Builder for constructing an `Oracle`.
pub struct OracleBuilder {
    seed: u64,
    variation_chance: f64,
    poems_path: Option<String>,
    keywords_path: Option<String>,
    synonyms_path: Option<String>,
    /// Directly provided poems (for testing without files).
    poems: Option<PoemBook>,
    keywords: Option<KeywordTable>,
    synonyms: Option<SynonymTable>,
}

impl Oracle {
    pub fn builder() -> OracleBuilder {
        OracleBuilder {
            seed: 0,
            variation_chance: VARIATION_CHANCE,
            poems_path: None,
            keywords_path: None,
            synonyms_path: None,
            poems: None,
            keywords: None,
            synonyms: None,
        }
    }

    /// Record the user's text. Non-blank text re-detects the mood; blank
    /// text keeps whatever mood was sensed last.
    pub fn set_input(&mut self, text: &str) -> Mood {
        self.input = text.to_string();
        if !text.trim().is_empty() {
            self.mood = self.detector.detect(text);
            tracing::debug!(mood = %self.mood, "mood updated");
        }
        self.mood
    }

    /// Show a new poem. Returns `None` without touching any state when
    /// there are no poems to choose from.
    pub fn ask(&mut self) -> Option<&Poem> {
        let mut poem = self.poems.choose(&mut self.rng)?.clone();

        self.last_variation_seed = None;
        if should_vary_at(&mut self.rng, self.variation_chance) {
            let seed: f64 = self.rng.gen();
            poem = self.variator.vary_poem(&poem, seed);
            self.last_variation_seed = Some(seed);
        }
        tracing::debug!(
            title = %poem.title,
            varied = self.last_variation_seed.is_some(),
            "oracle answered"
        );

        if let Some(previous) = self.current.take() {
            self.history.push(PoemMemory {
                id: self.next_memory_id,
                poem: previous,
                age: 0,
            });
            self.next_memory_id += 1;
        }

        self.visual_effect = VisualEffect::ALL[self.rng.gen_range(0..VisualEffect::ALL.len())];
        self.fading_out = false;
        self.current = Some(poem);
        self.current.as_ref()
    }

    /// Start fading the current poem out. The UI calls `ask` once
    /// `FADE_OUT_MS` has passed. False when nothing is shown.
    pub fn begin_fade(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        self.fading_out = true;
        true
    }

    /// Advance the history fade by one step and drop invisible memories.
    pub fn tick(&mut self) {
        for memory in &mut self.history {
            memory.age += 1;
        }
        self.history.retain(|memory| !memory.faded());
    }

    /// Switch between the standard and constellation views. Only
    /// possible while a poem is shown.
    pub fn toggle_view(&mut self) -> ViewMode {
        if self.current.is_some() {
            self.view_mode = self.view_mode.toggled();
        }
        self.view_mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn theme(&self) -> &'static MoodTheme {
        self.mood.theme()
    }

    pub fn current(&self) -> Option<&Poem> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[PoemMemory] {
        &self.history
    }

    pub fn visual_effect(&self) -> VisualEffect {
        self.visual_effect
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_fading_out(&self) -> bool {
        self.fading_out
    }

    /// Seed used to vary the current poem, if it was varied.
    pub fn last_variation_seed(&self) -> Option<f64> {
        self.last_variation_seed
    }

    pub fn poems(&self) -> &PoemBook {
        &self.poems
    }

    pub fn variator(&self) -> &Variator {
        &self.variator
    }
}

impl OracleBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Probability of varying a chosen poem (default 0.3).
    pub fn variation_chance(mut self, chance: f64) -> Self {
        self.variation_chance = chance;
        self
    }

    pub fn poems_path(mut self, path: &str) -> Self {
        self.poems_path = Some(path.to_string());
        self
    }

    pub fn keywords_path(mut self, path: &str) -> Self {
        self.keywords_path = Some(path.to_string());
        self
    }

    pub fn synonyms_path(mut self, path: &str) -> Self {
        self.synonyms_path = Some(path.to_string());
        self
    }

    /// Provide poems directly (for testing without files).
    pub fn with_poems(mut self, poems: PoemBook) -> Self {
        self.poems = Some(poems);
        self
    }

    /// Provide a keyword table directly instead of the built-in one.
    pub fn with_keywords(mut self, table: KeywordTable) -> Self {
        self.keywords = Some(table);
        self
    }

    /// Provide a synonym table directly instead of the built-in one.
    pub fn with_synonyms(mut self, table: SynonymTable) -> Self {
        self.synonyms = Some(table);
        self
    }

    pub fn build(self) -> Result<Oracle, OracleError> {
        if !(0.0..=1.0).contains(&self.variation_chance) {
            return Err(OracleError::InvalidVariationChance(self.variation_chance));
        }

        let mut poems = self.poems.unwrap_or_default();
        if let Some(ref path) = self.poems_path {
            poems.merge(PoemBook::load(Path::new(path))?);
        }

        let keywords = match (self.keywords, self.keywords_path) {
            (Some(table), _) => table,
            (None, Some(path)) => KeywordTable::load_from_ron(Path::new(&path))?,
            (None, None) => KeywordTable::builtin(),
        };
        keywords.validate()?;

        let synonyms = match (self.synonyms, self.synonyms_path) {
            (Some(table), _) => table,
            (None, Some(path)) => SynonymTable::load_from_ron(Path::new(&path))?,
            (None, None) => SynonymTable::builtin(),
        };

        tracing::debug!(
            poems = poems.len(),
            seed = self.seed,
            variation_chance = self.variation_chance,
            "oracle built"
        );

        Ok(Oracle {
            poems,
            detector: MoodDetector::new(keywords),
            variator: Variator::new(synonyms)?,
            variation_chance: self.variation_chance,
            rng: StdRng::seed_from_u64(self.seed),
            input: String::new(),
            mood: Mood::default(),
            current: None,
            history: Vec::new(),
            next_memory_id: 0,
            visual_effect: VisualEffect::Sparkles,
            view_mode: ViewMode::Standard,
            fading_out: false,
            last_variation_seed: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_book() -> PoemBook {
        PoemBook::new(vec![
            Poem::new("Night Garden", &["The moon keeps secrets", "beneath the stars"]),
            Poem::new("Morning", &["Sunlight on the sill", "a melody of dust"]),
            Poem::new("Plain", &["nothing to change here"]),
        ])
    }

    fn build_test_oracle(seed: u64) -> Oracle {
        Oracle::builder()
            .seed(seed)
            .with_poems(test_book())
            .build()
            .unwrap()
    }

    #[test]
    fn starts_mysterious_and_empty() {
        let oracle = build_test_oracle(1);
        assert_eq!(oracle.mood(), Mood::Mysterious);
        assert!(oracle.current().is_none());
        assert!(oracle.history().is_empty());
        assert_eq!(oracle.view_mode(), ViewMode::Standard);
        assert!(!oracle.is_fading_out());
    }

    #[test]
    fn set_input_updates_mood() {
        let mut oracle = build_test_oracle(1);
        assert_eq!(oracle.set_input("I feel so lonely"), Mood::Melancholy);
        assert_eq!(oracle.theme().particle_count, 40);
        assert_eq!(oracle.input(), "I feel so lonely");
    }

    #[test]
    fn blank_input_keeps_previous_mood() {
        let mut oracle = build_test_oracle(1);
        oracle.set_input("happy");
        assert_eq!(oracle.set_input("   "), Mood::Joyful);
        assert_eq!(oracle.set_input(""), Mood::Joyful);
        assert_eq!(oracle.input(), "");
    }

    #[test]
    fn ask_with_no_poems_is_noop() {
        let mut oracle = Oracle::builder().seed(3).build().unwrap();
        assert!(oracle.ask().is_none());
        assert!(oracle.current().is_none());
        assert!(oracle.history().is_empty());
    }

    #[test]
    fn ask_moves_previous_poem_into_history() {
        let mut oracle = build_test_oracle(7);
        oracle.ask().unwrap();
        let first = oracle.current().cloned().unwrap();
        assert!(oracle.history().is_empty());

        oracle.ask().unwrap();
        assert_eq!(oracle.history().len(), 1);
        assert_eq!(oracle.history()[0].poem, first);
        assert!((oracle.history()[0].opacity() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn history_fades_out_after_twenty_ticks() {
        let mut oracle = build_test_oracle(7);
        oracle.ask();
        oracle.ask();
        oracle.tick();
        assert!((oracle.history()[0].opacity() - 0.38).abs() < 1e-9);
        for _ in 0..18 {
            oracle.tick();
        }
        assert_eq!(oracle.history().len(), 1);
        assert!((oracle.history()[0].opacity() - 0.02).abs() < 1e-9);
        oracle.tick();
        assert!(oracle.history().is_empty());
    }

    #[test]
    fn memory_ids_increase() {
        let mut oracle = build_test_oracle(2);
        for _ in 0..4 {
            oracle.ask();
        }
        let ids: Vec<u64> = oracle.history().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn same_seed_same_session() {
        let run = |seed| {
            let mut oracle = build_test_oracle(seed);
            (0..20)
                .map(|_| {
                    let poem = oracle.ask().cloned().unwrap();
                    (poem, oracle.visual_effect(), oracle.last_variation_seed())
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn variation_always_with_chance_one() {
        let mut oracle = Oracle::builder()
            .seed(4)
            .variation_chance(1.0)
            .with_poems(PoemBook::new(vec![Poem::new("Sky", &["sky"])]))
            .build()
            .unwrap();
        for _ in 0..10 {
            oracle.ask();
            let seed = oracle.last_variation_seed().unwrap();
            let expected = oracle.variator().vary_line("sky", seed);
            assert_eq!(oracle.current().unwrap().lines[0], expected);
        }
    }

    #[test]
    fn no_variation_with_chance_zero() {
        let mut oracle = Oracle::builder()
            .seed(4)
            .variation_chance(0.0)
            .with_poems(test_book())
            .build()
            .unwrap();
        for _ in 0..20 {
            let poem = oracle.ask().cloned().unwrap();
            assert!(oracle.last_variation_seed().is_none());
            assert!(test_book().poems.contains(&poem));
        }
    }

    #[test]
    fn invalid_variation_chance_rejected() {
        for chance in [-0.1, 1.5, f64::NAN] {
            let result = Oracle::builder().variation_chance(chance).build();
            assert!(matches!(result, Err(OracleError::InvalidVariationChance(_))));
        }
    }

    #[test]
    fn fade_and_view_need_a_poem() {
        let mut oracle = build_test_oracle(5);
        assert!(!oracle.begin_fade());
        assert_eq!(oracle.toggle_view(), ViewMode::Standard);

        oracle.ask();
        assert!(oracle.begin_fade());
        assert!(oracle.is_fading_out());
        assert_eq!(oracle.toggle_view(), ViewMode::Constellation);
        assert_eq!(oracle.toggle_view(), ViewMode::Standard);

        oracle.ask();
        assert!(!oracle.is_fading_out());
    }

    #[test]
    fn every_visual_effect_appears() {
        let mut oracle = build_test_oracle(12);
        let mut seen = Vec::new();
        for _ in 0..60 {
            oracle.ask();
            if !seen.contains(&oracle.visual_effect()) {
                seen.push(oracle.visual_effect());
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn custom_tables_flow_through() {
        let keywords = KeywordTable::parse_ron(r#"[(mood: hopeful, keywords: ["sunrise"])]"#).unwrap();
        let synonyms = SynonymTable::parse_ron(
            r#"[(word: "sill", candidates: ["sill", "ledge"])]"#,
        )
        .unwrap();
        let mut oracle = Oracle::builder()
            .seed(8)
            .variation_chance(1.0)
            .with_keywords(keywords)
            .with_synonyms(synonyms)
            .with_poems(PoemBook::new(vec![Poem::new("Morning", &["Sunlight on the sill"])]))
            .build()
            .unwrap();

        assert_eq!(oracle.set_input("a sunrise"), Mood::Hopeful);
        assert_eq!(oracle.set_input("peace"), Mood::Mysterious);

        oracle.ask();
        let seed = oracle.last_variation_seed().unwrap();
        let expected = if seed < 0.5 { "Sunlight on the sill" } else { "Sunlight on the ledge" };
        assert_eq!(oracle.current().unwrap().lines[0], expected);
    }

    #[test]
    fn visual_effect_names() {
        let names: Vec<&str> = VisualEffect::ALL.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["sparkles", "ink", "stars"]);
    }

    #[test]
    fn view_mode_names_match_serialized_form() {
        for mode in [ViewMode::Standard, ViewMode::Constellation] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.name()));
        }
        assert_eq!(ViewMode::Standard.toggled().name(), "constellation");
    }
}
