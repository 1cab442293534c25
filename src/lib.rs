//! Illume — the logic behind a poem oracle.
//!
//! Reads a mood from the user's words, picks a poem, occasionally lets it
//! "live" by swapping words for seeded synonyms, and lays poems out as
//! constellations for the star view.

pub mod core;
pub mod schema;
