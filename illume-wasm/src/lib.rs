//! WASM bindings for illume — powers the browser oracle.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use illume::core::constellation::{Constellation, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use illume::core::oracle::{Oracle, VisualEffect, ViewMode};
use illume::core::variation;
use illume::schema::mood::{Mood, MoodTheme};
use illume::schema::poem::{Poem, PoemBook};

// ---------------------------------------------------------------------------
// Embedded poems — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const POEMS: &str = include_str!("../../oracle_data/poems.json");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct MemoryInfo<'a> {
    id: u64,
    first_line: &'a str,
    opacity: f64,
}

#[derive(serde::Serialize)]
struct OracleSnapshot<'a> {
    input: &'a str,
    mood: Mood,
    /// Whether the UI should announce the mood ("sensing a calm mood...").
    sensing: bool,
    theme: &'static MoodTheme,
    poem: Option<&'a Poem>,
    history: Vec<MemoryInfo<'a>>,
    visual_effect: VisualEffect,
    view_mode: ViewMode,
    fading_out: bool,
}

#[derive(serde::Serialize)]
struct ConstellationInfo<'a> {
    #[serde(flatten)]
    constellation: &'a Constellation,
    connections: Vec<(usize, usize)>,
}

fn snapshot(oracle: &Oracle) -> OracleSnapshot<'_> {
    OracleSnapshot {
        input: oracle.input(),
        mood: oracle.mood(),
        sensing: !oracle.mood().is_default(),
        theme: oracle.theme(),
        poem: oracle.current(),
        history: oracle
            .history()
            .iter()
            .map(|memory| MemoryInfo {
                id: memory.id,
                first_line: memory.poem.first_line().unwrap_or(""),
                opacity: memory.opacity(),
            })
            .collect(),
        visual_effect: oracle.visual_effect(),
        view_mode: oracle.view_mode(),
        fading_out: oracle.is_fading_out(),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// Stateless helpers
// ---------------------------------------------------------------------------

/// Detect the mood of a phrase. Returns the lowercase mood name.
#[wasm_bindgen]
pub fn detect_mood(input: &str) -> String {
    illume::core::mood::detect_mood(input).name().to_string()
}

/// Vary a line with the built-in synonyms and a seed in [0, 1).
#[wasm_bindgen]
pub fn vary_line(line: &str, seed: f64) -> String {
    variation::vary_line(line, seed)
}

/// The 30% living-poem gate, drawn from the browser's RNG.
#[wasm_bindgen]
pub fn should_vary() -> bool {
    variation::should_vary()
}

/// Return the theme for a mood name as JSON.
#[wasm_bindgen]
pub fn mood_theme(mood: &str) -> Result<String, JsError> {
    let mood: Mood = mood.parse().map_err(|e| JsError::new(&format!("{e}")))?;
    to_json(mood.theme())
}

/// Return JSON array of mood names in detection order.
#[wasm_bindgen]
pub fn moods() -> String {
    let names: Vec<&str> = Mood::ALL.iter().map(|m| m.name()).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

// ---------------------------------------------------------------------------
// OracleDemo — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct OracleDemo {
    oracle: Oracle,
    constellation: Option<Constellation>,
    layout_rng: StdRng,
}

#[wasm_bindgen]
impl OracleDemo {
    /// Create a session over the embedded poems, or over `poems_json`
    /// (a JSON array of `{ title, lines }`) when given.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, poems_json: Option<String>) -> Result<OracleDemo, JsError> {
        let source = poems_json.as_deref().unwrap_or(data::POEMS);
        let poems = PoemBook::parse_json(source)
            .map_err(|e| JsError::new(&format!("Poem parse error: {e}")))?;

        let oracle = Oracle::builder()
            .seed(seed)
            .with_poems(poems)
            .build()
            .map_err(|e| JsError::new(&format!("Oracle build error: {e}")))?;

        Ok(OracleDemo {
            oracle,
            constellation: None,
            layout_rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Record typed text. Returns the current mood name.
    pub fn set_input(&mut self, text: &str) -> String {
        self.oracle.set_input(text).name().to_string()
    }

    /// Mark the current poem as fading. The page waits `fade_out_ms()`
    /// before calling `ask`.
    pub fn begin_fade(&mut self) -> bool {
        self.oracle.begin_fade()
    }

    /// Show a new poem. Returns the session snapshot as JSON, or `None`
    /// when there are no poems (the session is left as it was).
    pub fn ask(&mut self) -> Result<Option<String>, JsError> {
        let Some(poem) = self.oracle.ask().cloned() else {
            return Ok(None);
        };
        self.constellation = Some(Constellation::layout(
            &poem.title,
            &poem.lines,
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
            &mut self.layout_rng,
        ));
        self.state().map(Some)
    }

    /// Advance the history fade. Call every `history_tick_ms()`.
    pub fn tick(&mut self) {
        self.oracle.tick();
    }

    /// Toggle between the standard and constellation views. Returns the
    /// new view mode name.
    pub fn toggle_view(&mut self) -> String {
        self.oracle.toggle_view().name().to_string()
    }

    /// Return the full session state as JSON.
    pub fn state(&self) -> Result<String, JsError> {
        to_json(&snapshot(&self.oracle))
    }

    /// Reveal stars up to `elapsed_ms` since the constellation view opened
    /// and return stars plus connections as JSON (`null` without a poem).
    pub fn constellation(&mut self, elapsed_ms: f64) -> Result<String, JsError> {
        let Some(constellation) = self.constellation.as_mut() else {
            return Ok("null".to_string());
        };
        constellation.reveal_until(elapsed_ms.max(0.0) as u64);
        to_json(&ConstellationInfo {
            connections: constellation.connections(),
            constellation,
        })
    }

    /// Word under the pointer in constellation coordinates, if any.
    pub fn hovered_word(&self, x: f64, y: f64) -> Option<String> {
        self.constellation
            .as_ref()
            .and_then(|c| c.hovered_word(x, y))
            .map(str::to_string)
    }

    pub fn fade_out_ms() -> u32 {
        illume::core::oracle::FADE_OUT_MS as u32
    }

    pub fn history_tick_ms() -> u32 {
        illume::core::oracle::HISTORY_TICK_MS as u32
    }
}
