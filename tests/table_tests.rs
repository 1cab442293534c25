/// Mood and synonym table integration tests — shipped data files and the
/// behaviour the UI relies on.

use illume::core::mood::{detect_mood, KeywordTable, MoodDetector};
use illume::core::table::TableError;
use illume::core::variation::{vary_line, SynonymTable, Variator};
use illume::schema::mood::Mood;

#[test]
fn shipped_keyword_table_matches_builtin() {
    let path = std::path::Path::new("oracle_data/keywords.ron");
    let table = KeywordTable::load_from_ron(path).unwrap();
    assert_eq!(table, KeywordTable::builtin());
}

#[test]
fn shipped_synonym_table_matches_builtin() {
    let path = std::path::Path::new("oracle_data/synonyms.ron");
    let table = SynonymTable::load_from_ron(path).unwrap();
    assert_eq!(table, SynonymTable::builtin());
}

#[test]
fn every_mood_reachable_by_its_own_keywords() {
    let table = KeywordTable::builtin();
    for entry in &table.entries {
        for keyword in &entry.keywords {
            assert_eq!(
                detect_mood(keyword),
                entry.mood,
                "keyword '{}' should select {}",
                keyword,
                entry.mood
            );
        }
    }
}

#[test]
fn first_label_wins_regardless_of_text_position() {
    assert_eq!(detect_mood("calm secret"), Mood::Calm);
    assert_eq!(detect_mood("a secret, and then calm"), Mood::Calm);
    assert_eq!(detect_mood("why do I hope"), Mood::Hopeful);
}

#[test]
fn fixture_keywords_replace_builtin_order() {
    let table =
        KeywordTable::load_from_ron(std::path::Path::new("tests/fixtures/test_keywords.ron"))
            .unwrap();
    let detector = MoodDetector::new(table);
    assert_eq!(detector.detect("Sing in the RAIN"), Mood::Joyful);
    assert_eq!(detector.detect("rain again"), Mood::Melancholy);
    assert_eq!(detector.detect("peace"), Mood::Mysterious);
}

#[test]
fn fixture_synonyms_vary_lines() {
    let table =
        SynonymTable::load_from_ron(std::path::Path::new("tests/fixtures/test_synonyms.ron"))
            .unwrap();
    let variator = Variator::new(table).unwrap();
    assert_eq!(
        variator.vary_line("Rain on the lamp, rain on the roof", 0.9),
        "downpour on the lantern, downpour on the roof"
    );
    assert_eq!(variator.vary_line("rainbow lamps", 0.9), "rainbow lamps");
}

#[test]
fn bad_synonym_fixture_rejected() {
    let result =
        SynonymTable::load_from_ron(std::path::Path::new("tests/fixtures/bad_synonyms.ron"));
    assert!(matches!(result, Err(TableError::CanonicalNotFirst(word)) if word == "rain"));
}

#[test]
fn builtin_variation_examples() {
    assert_eq!(vary_line("a plain sentence", 0.42), "a plain sentence");
    assert_eq!(vary_line("starship stars", 0.0), "starship stars");
    assert_eq!(
        vary_line("Darkness and darkness again", 0.6),
        "night and night again"
    );
}
