// Per-generation spelling assignment.
//
// Each generation, every morpheme without a spelling flips a coin
// (`probability_to_seek`). Morphemes that seek a spelling gather candidates
// from three sources:
// - phonetic: spellings of pronunciations near this one (`closest_prons`).
//   A telescoped neighbor contributes the cross product of both halves'
//   spellings, each pair concatenated and denoted by the provenance `l.r`.
// - semantic: spellings of morphemes sharing an atomic tag of this concept,
//   plus the full composite name when there is more than one tag.
// - combined: every semantic candidate followed by every phonetic candidate,
//   denoted `sem+phon`, carrying the phonetic candidate's source.
// Candidates with `MAX_GLYPHS` or more glyphs are discarded, the rest are
// shuffled, and the first one whose spelling is unused wins. A used spelling
// is accepted only with `probability_to_reuse`. If nothing is accepted the
// morpheme waits for the next generation.
//
// Freeze filtering happens in the lexicon's candidate lookups, so telescoped
// and combined candidates are built only from halves that passed it.
//
// Randomness is consumed in a fixed order (seek coin, shuffle, reuse coins)
// over morphemes in insertion order, so a seed reproduces a run exactly.

use crate::config::SimConfig;
use crate::distance::{DistanceCache, NeighborSource, PhonologicalDistance, TelescopePolicy};
use crate::lexicon::Lexicon;
use crate::types::{Denotation, Symbol};
use glyphic_grammar::GrammarEngine;
use glyphic_prng::SimRng;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Candidates with this many glyphs or more are unreadable and never used.
pub const MAX_GLYPHS: usize = 5;

/// A candidate spelling and the pronunciation that motivated it, if any.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub symbol: Symbol,
    pub source: Option<String>,
}

/// What happened in one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: usize,
    /// Unspelled morphemes at the start of the generation.
    pub unspelled: usize,
    /// Morphemes that sought a spelling.
    pub attempted: usize,
    /// Seekers skipped for having an empty pronunciation.
    pub skipped_empty: usize,
    /// Seekers that accepted a candidate.
    pub spelled: usize,
    /// Accepted candidates whose spelling was already in use.
    pub reused: usize,
    pub phonetic_candidates: usize,
    pub semantic_candidates: usize,
    pub combined_candidates: usize,
}

#[derive(Debug, Clone)]
pub struct SpellingAssignmentEngine {
    probability_to_seek: f64,
    probability_to_reuse: f64,
    telescope_policy: TelescopePolicy,
}

impl SpellingAssignmentEngine {
    pub fn new(
        probability_to_seek: f64,
        probability_to_reuse: f64,
        telescope_policy: TelescopePolicy,
    ) -> Self {
        Self {
            probability_to_seek,
            probability_to_reuse,
            telescope_policy,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.probability_to_seek_spelling,
            config.probability_to_reuse_spelling,
            config.telescope_policy,
        )
    }

    /// Run one generation over every morpheme that has no spelling yet.
    pub fn run_generation<G: GrammarEngine + ?Sized>(
        &self,
        generation: usize,
        lexicon: &mut Lexicon,
        engine: &G,
        cache: &mut DistanceCache,
        rng: &mut SimRng,
    ) -> GenerationReport {
        let useful = lexicon.useful_pronunciations();
        let unspelled = lexicon.unspelled();
        debug!(
            generation,
            useful = useful.len(),
            unspelled = unspelled.len(),
            "starting generation"
        );
        let mut distance = PhonologicalDistance::new(useful, engine, cache, self.telescope_policy);
        let mut report = GenerationReport {
            generation,
            unspelled: unspelled.len(),
            ..Default::default()
        };

        for id in unspelled {
            if !rng.random_bool(self.probability_to_seek) {
                continue;
            }
            report.attempted += 1;
            let pron = lexicon.morpheme(id).phonology().to_string();
            if pron.is_empty() {
                report.skipped_empty += 1;
                continue;
            }

            let phonetic = phonetic_candidates(lexicon, &mut distance, &pron);
            let concept = lexicon.morpheme(id).concept().clone();
            let semantic = semantic_candidates(lexicon, concept.tags(), concept.name());
            let combined = combined_candidates(&semantic, &phonetic);
            report.phonetic_candidates += phonetic.len();
            report.semantic_candidates += semantic.len();
            report.combined_candidates += combined.len();
            trace!(
                morpheme = %lexicon.morpheme(id),
                phonetic = phonetic.len(),
                semantic = semantic.len(),
                combined = combined.len(),
                "gathered candidates"
            );

            let mut candidates: Vec<Candidate> = phonetic
                .into_iter()
                .chain(semantic.into_iter().map(|symbol| Candidate {
                    symbol,
                    source: None,
                }))
                .chain(combined)
                .filter(|c| c.symbol.glyph_count() < MAX_GLYPHS)
                .collect();
            rng.shuffle(&mut candidates);

            let Some((index, reuse)) = self.pick(&candidates, lexicon.used_spellings(), rng)
            else {
                continue;
            };
            let Candidate { symbol, source } = candidates.swap_remove(index);
            debug!(
                spelling = %symbol,
                source = source.as_deref().unwrap_or(""),
                reuse,
                "assigned spelling to {}",
                lexicon.morpheme(id)
            );
            lexicon.assign_spelling(id, symbol, source.as_deref());
            report.spelled += 1;
            if reuse {
                report.reused += 1;
            }
        }
        debug!(
            generation,
            attempted = report.attempted,
            spelled = report.spelled,
            "finished generation"
        );
        report
    }

    /// Walk `candidates` in order and return the index of the first one
    /// accepted, plus whether its spelling was already used. Unused spellings
    /// are accepted outright; each used one costs a reuse coin flip.
    pub fn pick(
        &self,
        candidates: &[Candidate],
        used: &BTreeSet<String>,
        rng: &mut SimRng,
    ) -> Option<(usize, bool)> {
        candidates.iter().enumerate().find_map(|(i, c)| {
            let reuse = used.contains(&c.symbol.spelling());
            if !reuse || rng.random_bool(self.probability_to_reuse) {
                Some((i, reuse))
            } else {
                None
            }
        })
    }
}

fn phonetic_candidates<G: GrammarEngine + ?Sized>(
    lexicon: &Lexicon,
    distance: &mut PhonologicalDistance<'_, G>,
    pron: &str,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for neighbor in distance.closest_prons(pron) {
        let source = neighbor.source.to_string();
        match &neighbor.source {
            NeighborSource::Single(p) => {
                for symbol in lexicon.get_symbols_from_pron(p) {
                    candidates.push(Candidate {
                        symbol,
                        source: Some(source.clone()),
                    });
                }
            }
            NeighborSource::Telescoped { left, right } => {
                let lefts = lexicon.get_symbols_from_pron(left);
                let rights = lexicon.get_symbols_from_pron(right);
                for l in &lefts {
                    for r in &rights {
                        candidates.push(Candidate {
                            symbol: l.concat(r, Denotation::Phonetic(source.clone())),
                            source: Some(source.clone()),
                        });
                    }
                }
            }
        }
    }
    candidates
}

fn semantic_candidates(lexicon: &mut Lexicon, tags: &[String], name: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    for tag in tags {
        symbols.extend(lexicon.get_symbols_from_sem(tag));
    }
    if tags.len() > 1 {
        symbols.extend(lexicon.get_symbols_from_sem(name));
    }
    symbols
}

fn combined_candidates(semantic: &[Symbol], phonetic: &[Candidate]) -> Vec<Candidate> {
    let mut combined = Vec::with_capacity(semantic.len() * phonetic.len());
    for p in phonetic {
        for s in semantic {
            let denotation = Denotation::Composite {
                semantic: s.denotation().text(),
                phonetic: p.symbol.denotation().text(),
            };
            combined.push(Candidate {
                symbol: s.concat(&p.symbol, denotation),
                source: p.source.clone(),
            });
        }
    }
    combined
}
