// Table-driven grammar engine for tests.
//
// Every answer comes from a lookup table filled in by the test: a fixed
// morph list (returned in order, cycling if more are requested), directional
// distance entries with a fallback, ablaut entries (absent = no transform),
// and a vowel set. Distance lookups are counted so tests can observe
// memoization in callers.

use crate::error::GrammarError;
use crate::{EditDistance, GrammarEngine};
use glyphic_prng::SimRng;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// Deterministic fake engine.
#[derive(Debug, Clone)]
pub struct TableGrammar {
    template: String,
    morphs: Vec<String>,
    distances: BTreeMap<(String, String), EditDistance>,
    fallback: EditDistance,
    ablauts: BTreeMap<String, String>,
    vowels: BTreeSet<char>,
    distance_calls: Cell<usize>,
}

impl TableGrammar {
    /// An engine whose vowels are the characters of `vowels`.
    ///
    /// Unlisted pairs are unrelated: one step at infinite cost.
    pub fn new(vowels: &str) -> Self {
        Self {
            template: crate::DEFAULT_TEMPLATE.to_string(),
            morphs: Vec::new(),
            distances: BTreeMap::new(),
            fallback: EditDistance {
                edits: 1,
                cost: f64::INFINITY,
            },
            ablauts: BTreeMap::new(),
            vowels: vowels.chars().collect(),
            distance_calls: Cell::new(0),
        }
    }

    /// Accept only this template name in `generate_morphs`.
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    pub fn with_morphs<I, S>(mut self, morphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.morphs = morphs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the result for `s1` aligned against `s2` (one direction only).
    pub fn with_distance(mut self, s1: &str, s2: &str, edits: usize, cost: f64) -> Self {
        self.distances
            .insert((s1.to_string(), s2.to_string()), EditDistance { edits, cost });
        self
    }

    /// Set the same result for both directions.
    pub fn with_symmetric_distance(self, s1: &str, s2: &str, edits: usize, cost: f64) -> Self {
        self.with_distance(s1, s2, edits, cost)
            .with_distance(s2, s1, edits, cost)
    }

    pub fn with_fallback_distance(mut self, edits: usize, cost: f64) -> Self {
        self.fallback = EditDistance { edits, cost };
        self
    }

    pub fn with_ablaut(mut self, from: &str, to: &str) -> Self {
        self.ablauts.insert(from.to_string(), to.to_string());
        self
    }

    /// How many times `phonetic_distance` has been called.
    pub fn distance_calls(&self) -> usize {
        self.distance_calls.get()
    }
}

impl GrammarEngine for TableGrammar {
    fn generate_morphs(
        &self,
        template: &str,
        n: usize,
        _rng: &mut SimRng,
    ) -> Result<Vec<String>, GrammarError> {
        if template != self.template {
            return Err(GrammarError::rule_not_found(template, "<table grammar>"));
        }
        Ok(self.morphs.iter().cycle().take(n).cloned().collect())
    }

    fn phonetic_distance(&self, s1: &str, s2: &str) -> EditDistance {
        self.distance_calls.set(self.distance_calls.get() + 1);
        self.distances
            .get(&(s1.to_string(), s2.to_string()))
            .copied()
            .unwrap_or(self.fallback)
    }

    fn ablaut(&self, pron: &str) -> Result<String, GrammarError> {
        Ok(self.ablauts.get(pron).cloned().unwrap_or_default())
    }

    fn is_vowel(&self, phoneme: char) -> bool {
        self.vowels.contains(&phoneme)
    }
}
