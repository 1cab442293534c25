/// Constellation view — poem words laid out as stars on a canvas.
///
/// Only geometry and reveal state live here; the host draws the stars and
/// feeds in elapsed time and pointer positions.
use rand::Rng;
use serde::Serialize;

pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 400.0;

/// Horizontal spacing between consecutive words.
const STEP_X: f64 = 80.0;
/// Vertical spacing between rows of eight words.
const STEP_Y: f64 = 80.0;
const WORDS_PER_ROW: usize = 8;
const MARGIN: f64 = 100.0;
/// Maximum random offset added on each axis.
const JITTER: f64 = 40.0;

/// Delay between two stars appearing.
pub const REVEAL_INTERVAL_MS: u64 = 200;
/// Pointer distance within which a star counts as hovered.
pub const HOVER_RADIUS: f64 = 15.0;

const STAR_RADIUS: f64 = 4.0;
const HOVERED_STAR_RADIUS: f64 = 6.0;
const GLOW_FACTOR: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub word: String,
    pub revealed: bool,
}

impl Star {
    /// Core radius of the star; the glow extends three times further.
    pub fn radius(hovered: bool) -> f64 {
        if hovered {
            HOVERED_STAR_RADIUS
        } else {
            STAR_RADIUS
        }
    }

    pub fn glow_radius(hovered: bool) -> f64 {
        Self::radius(hovered) * GLOW_FACTOR
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((x - self.x).powi(2) + (y - self.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constellation {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub stars: Vec<Star>,
}

impl Constellation {
    /// Lay out every word of the poem, left to right with wraparound,
    /// stepping down a row every eight words.
    pub fn layout<R: Rng, S: AsRef<str>>(
        title: &str,
        lines: &[S],
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Self {
        let wrap = (width - MARGIN).max(1.0);
        let stars = lines
            .iter()
            .flat_map(|line| line.as_ref().split_whitespace())
            .enumerate()
            .map(|(i, word)| {
                let jitter_x: f64 = rng.gen();
                let jitter_y: f64 = rng.gen();
                Star {
                    x: (i as f64 * STEP_X + MARGIN + jitter_x * JITTER) % wrap,
                    y: MARGIN + (i / WORDS_PER_ROW) as f64 * STEP_Y + jitter_y * JITTER,
                    word: word.to_string(),
                    revealed: false,
                }
            })
            .collect();

        Self {
            title: title.to_string(),
            width,
            height,
            stars,
        }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Reveal every star whose turn has come by `elapsed_ms`.
    /// Stars never un-reveal. Returns the number of revealed stars.
    pub fn reveal_until(&mut self, elapsed_ms: u64) -> usize {
        for (i, star) in self.stars.iter_mut().enumerate() {
            if elapsed_ms >= i as u64 * REVEAL_INTERVAL_MS {
                star.revealed = true;
            }
        }
        self.revealed_count()
    }

    pub fn revealed_count(&self) -> usize {
        self.stars.iter().filter(|star| star.revealed).count()
    }

    /// Time at which the last star appears.
    pub fn full_reveal_ms(&self) -> u64 {
        self.stars.len().saturating_sub(1) as u64 * REVEAL_INTERVAL_MS
    }

    /// Index pairs of neighbouring words that are both visible.
    pub fn connections(&self) -> Vec<(usize, usize)> {
        self.stars
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].revealed && pair[1].revealed)
            .map(|(i, _)| (i, i + 1))
            .collect()
    }

    /// The first star within `HOVER_RADIUS` of the pointer.
    pub fn hovered(&self, x: f64, y: f64) -> Option<&Star> {
        self.stars
            .iter()
            .find(|star| star.distance_to(x, y) < HOVER_RADIUS)
    }

    pub fn hovered_word(&self, x: f64, y: f64) -> Option<&str> {
        self.hovered(x, y).map(|star| star.word.as_str())
    }
}
