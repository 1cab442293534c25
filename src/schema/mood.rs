use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The emotional tone read from the user's input.
///
/// Declaration order matters: mood detection walks the labels in this
/// order and the first label with a matching keyword wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Melancholy,
    Hopeful,
    Mysterious,
    Joyful,
    Introspective,
}

impl Default for Mood {
    fn default() -> Self {
        Self::Mysterious
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mood: {0}")]
pub struct UnknownMood(pub String);

/// Presentation parameters for a mood: background gradient and the
/// particle field drawn behind the poem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodTheme {
    pub gradient: &'static str,
    pub particle_color: &'static str,
    pub glow_color: &'static str,
    pub particle_count: u32,
}

const THEMES: [MoodTheme; 6] = [
    MoodTheme {
        gradient: "from-slate-950 via-blue-950 to-teal-950",
        particle_color: "rgba(147, 197, 253, 0.6)",
        glow_color: "rgba(147, 197, 253, 0.3)",
        particle_count: 60,
    },
    MoodTheme {
        gradient: "from-black via-slate-900 to-blue-900",
        particle_color: "rgba(148, 163, 184, 0.5)",
        glow_color: "rgba(148, 163, 184, 0.2)",
        particle_count: 40,
    },
    MoodTheme {
        gradient: "from-slate-900 via-amber-950 to-orange-950",
        particle_color: "rgba(251, 191, 36, 0.6)",
        glow_color: "rgba(251, 191, 36, 0.3)",
        particle_count: 80,
    },
    MoodTheme {
        gradient: "from-black via-purple-950 to-slate-900",
        particle_color: "rgba(168, 85, 247, 0.6)",
        glow_color: "rgba(168, 85, 247, 0.3)",
        particle_count: 70,
    },
    MoodTheme {
        gradient: "from-slate-900 via-pink-950 to-orange-950",
        particle_color: "rgba(251, 146, 60, 0.7)",
        glow_color: "rgba(251, 146, 60, 0.4)",
        particle_count: 100,
    },
    MoodTheme {
        gradient: "from-black via-indigo-950 to-slate-900",
        particle_color: "rgba(199, 210, 254, 0.5)",
        glow_color: "rgba(199, 210, 254, 0.3)",
        particle_count: 50,
    },
];

impl Mood {
    /// All moods in declaration order.
    pub const ALL: [Mood; 6] = [
        Self::Calm,
        Self::Melancholy,
        Self::Hopeful,
        Self::Mysterious,
        Self::Joyful,
        Self::Introspective,
    ];

    /// Lowercase label, e.g. "melancholy".
    pub fn name(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Melancholy => "melancholy",
            Self::Hopeful => "hopeful",
            Self::Mysterious => "mysterious",
            Self::Joyful => "joyful",
            Self::Introspective => "introspective",
        }
    }

    /// True for the fallback mood. The UI only announces a sensed mood
    /// when this is false.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn theme(&self) -> &'static MoodTheme {
        &THEMES[*self as usize]
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mood| mood.name() == wanted)
            .ok_or(UnknownMood(s.to_string()))
    }
}
