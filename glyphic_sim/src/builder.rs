// Initial lexicon construction.
//
// Setup runs in two phases over a pool of `nmorphs` pronunciations drawn from
// the grammar's base-morph template (the pool may repeat):
// 1. Base concepts, in inventory order. Each draws 1-3 morphs from the pool
//    (with replacement, duplicates collapsed). The first becomes the
//    concept's primary exponent, spelled with the concept's glyph. The rest
//    are non-primary and get the glyph too only when
//    `initialize_non_primaries_with_symbol` is set.
// 2. Every pool entry not used in phase 1 gets a random composite of 1-3
//    distinct base concepts and no spelling. The first morph to receive a
//    given composite is its primary exponent. A single-tag composite takes
//    over the primary slot of its base concept; the glyph stays on the
//    phase-1 morph.

use crate::concepts::ConceptInventory;
use crate::config::SimConfig;
use crate::lexicon::Lexicon;
use crate::types::{Concept, Denotation, Morpheme, Symbol};
use glyphic_grammar::{GrammarEngine, GrammarError};
use glyphic_prng::SimRng;
use std::collections::BTreeSet;
use tracing::debug;

/// Most morphs a base concept draws, and most tags in a composite.
const MAX_DRAWS: usize = 3;

/// Build the generation-0 lexicon.
pub fn build_lexicon<G: GrammarEngine + ?Sized>(
    engine: &G,
    inventory: &ConceptInventory,
    config: &SimConfig,
    rng: &mut SimRng,
) -> Result<Lexicon, GrammarError> {
    let morphs = engine.generate_morphs(&config.base_morph, config.nmorphs, rng)?;
    let mut lexicon = Lexicon::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for entry in inventory.all() {
        for (i, morph) in select_morphs(&morphs, rng).into_iter().enumerate() {
            seen.insert(morph);
            let is_primary = i == 0;
            let symbol = (is_primary || config.initialize_non_primaries_with_symbol)
                .then(|| Symbol::new(entry.glyph.as_str(), Denotation::Semantic(entry.name.clone())));
            lexicon.add_morpheme(Morpheme::new(
                morph,
                Concept::new(&entry.name),
                symbol,
                is_primary,
            ));
        }
    }
    let base = lexicon.len();

    let names = inventory.names();
    let mut combinations: BTreeSet<String> = BTreeSet::new();
    for morph in &morphs {
        if seen.contains(morph.as_str()) || names.is_empty() {
            continue;
        }
        let concept = concept_combination(&names, rng);
        let is_primary = combinations.insert(concept.name().to_string());
        lexicon.add_morpheme(Morpheme::new(morph.as_str(), concept, None, is_primary));
    }

    debug!(
        pool = morphs.len(),
        base,
        composite = lexicon.len() - base,
        "built lexicon"
    );
    Ok(lexicon)
}

/// Draw 1-3 morphs with replacement, keeping first occurrences in draw order.
fn select_morphs<'a>(morphs: &'a [String], rng: &mut SimRng) -> Vec<&'a str> {
    let draws = rng.range_usize_inclusive(1, MAX_DRAWS);
    let mut selected: Vec<&str> = Vec::with_capacity(draws);
    for _ in 0..draws {
        let Some(morph) = rng.choose(morphs) else {
            break;
        };
        if !selected.contains(&morph.as_str()) {
            selected.push(morph);
        }
    }
    selected
}

/// A composite of 1-3 distinct concepts, tags in draw order.
fn concept_combination(names: &[&str], rng: &mut SimRng) -> Concept {
    let k = rng.range_usize_inclusive(1, MAX_DRAWS);
    let tags: Vec<&str> = rng
        .sample_indices(names.len(), k)
        .into_iter()
        .map(|i| names[i])
        .collect();
    Concept::from_tags(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphic_grammar::TableGrammar;

    fn inventory() -> ConceptInventory {
        ConceptInventory::from_json(
            r#"{"concepts": [
                {"name": "SUN", "glyph": "☉"},
                {"name": "MOON", "glyph": "☽"},
                {"name": "KING", "glyph": "♔"}
            ]}"#,
        )
        .unwrap()
    }

    fn engine() -> TableGrammar {
        TableGrammar::new("aeiou").with_morphs([
            "pa", "ti", "ku", "mo", "se", "la", "ri", "no", "bu", "de", "go", "fa",
        ])
    }

    fn config(nmorphs: usize) -> SimConfig {
        SimConfig {
            nmorphs,
            ..Default::default()
        }
    }

    #[test]
    fn every_base_concept_has_a_spelled_primary() {
        let lex = build_lexicon(&engine(), &inventory(), &config(12), &mut SimRng::new(3)).unwrap();
        for (name, glyph) in [("SUN", "☉"), ("MOON", "☽"), ("KING", "♔")] {
            // Phase-1 morphs come first, so the first match is the base one.
            let first = lex
                .morphemes()
                .iter()
                .find(|m| m.concept().name() == name)
                .unwrap();
            assert!(first.is_primary());
            assert_eq!(first.symbol().unwrap().spelling(), format!("{{{glyph}}}[{name}]"));
            assert!(lex.primary_exponent(name).is_some());
        }
    }

    #[test]
    fn only_base_primaries_start_spelled() {
        let lex = build_lexicon(&engine(), &inventory(), &config(12), &mut SimRng::new(3)).unwrap();
        assert_eq!(lex.spelled_count(), 3);
        for m in lex.morphemes().iter().filter(|m| m.is_spelled()) {
            assert!(m.is_primary());
            assert!(!m.concept().is_composite());
        }
    }

    #[test]
    fn first_single_tag_leftover_becomes_primary() {
        let inventory =
            ConceptInventory::from_json(r#"{"concepts": [{"name": "SUN", "glyph": "☉"}]}"#)
                .unwrap();
        let config = SimConfig {
            nmorphs: 6,
            initialize_non_primaries_with_symbol: true,
            ..Default::default()
        };
        // With one concept every leftover morph is assigned plain `SUN`, and
        // every phase-1 morph is spelled, so the unspelled ones are leftovers.
        let lex = build_lexicon(&engine(), &inventory, &config, &mut SimRng::new(4)).unwrap();
        let leftovers: Vec<&Morpheme> = lex.morphemes().iter().filter(|m| !m.is_spelled()).collect();
        assert!(!leftovers.is_empty());
        assert!(leftovers[0].is_primary());
        assert!(leftovers[1..].iter().all(|m| !m.is_primary()));
        assert_eq!(
            lex.primary_exponent("SUN").unwrap().phonology(),
            leftovers[0].phonology()
        );
        // The glyph stays with the setup morph.
        let base = &lex.morphemes()[0];
        assert!(base.is_primary());
        assert_eq!(base.symbol().unwrap().spelling(), "{☉}[SUN]");
    }

    #[test]
    fn non_primaries_can_start_spelled() {
        let config = SimConfig {
            nmorphs: 12,
            initialize_non_primaries_with_symbol: true,
            ..Default::default()
        };
        let inventory = ConceptInventory::embedded();
        let lex = build_lexicon(&engine(), &inventory, &config, &mut SimRng::new(3)).unwrap();
        // Base-concept morphemes come first and are all spelled.
        let spelled = lex.spelled_count();
        let base = &lex.morphemes()[..spelled];
        assert!(base.iter().all(|m| m.is_spelled()));
        assert!(base.iter().any(|m| !m.is_primary()));
        assert!(lex.morphemes()[spelled..].iter().all(|m| !m.is_spelled()));
    }

    #[test]
    fn leftover_morphs_get_unspelled_composites() {
        let lex = build_lexicon(&engine(), &inventory(), &config(12), &mut SimRng::new(8)).unwrap();
        let base = ["SUN", "MOON", "KING"];
        for m in lex.morphemes().iter().filter(|m| !m.is_spelled()) {
            let tags = m.concept().tags();
            assert!((1..=3).contains(&tags.len()));
            assert!(tags.iter().all(|t| base.contains(&t.as_str())));
            let distinct: BTreeSet<&String> = tags.iter().collect();
            assert_eq!(distinct.len(), tags.len());
        }
        // Base concepts use at most 9 of the 12 distinct pool entries.
        assert!(lex.len() >= 12 - 9 + 3);
    }

    #[test]
    fn first_morph_of_a_composite_is_primary() {
        let lex = build_lexicon(&engine(), &inventory(), &config(12), &mut SimRng::new(21)).unwrap();
        let mut seen = BTreeSet::new();
        for m in lex.morphemes().iter().filter(|m| !m.is_spelled()) {
            if m.concept().is_composite() {
                assert_eq!(m.is_primary(), seen.insert(m.concept().name().to_string()));
            }
        }
    }

    #[test]
    fn same_seed_same_lexicon() {
        let dump = |seed| {
            let lex =
                build_lexicon(&engine(), &inventory(), &config(12), &mut SimRng::new(seed)).unwrap();
            let mut out = Vec::new();
            lex.dump_morphemes(&mut out).unwrap();
            out
        };
        assert_eq!(dump(5), dump(5));
    }

    #[test]
    fn unknown_template_fails() {
        let config = SimConfig {
            base_morph: "TRISYLLABLE".into(),
            ..config(12)
        };
        assert!(build_lexicon(&engine(), &inventory(), &config, &mut SimRng::new(0)).is_err());
    }

    #[test]
    fn select_morphs_deduplicates() {
        let pool = ["pa".to_string()];
        let mut rng = SimRng::new(1);
        for _ in 0..20 {
            assert_eq!(select_morphs(&pool, &mut rng), vec!["pa"]);
        }
        assert!(select_morphs(&[], &mut rng).is_empty());
    }
}
