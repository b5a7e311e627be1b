// Phonological neighborhoods over the pronunciations that already have
// spellings.
//
// `PhonologicalDistance` is rebuilt once per generation from the lexicon's
// useful pronunciations. Construction extends that set by telescoping: for
// every ordered pair (p1, p2) where p1 ends in the vowel p2 starts with, the
// compound `p1 + p2[1..]` is synthesized (the shared vowel appears once) and
// remembered as coming from `p1.p2`. Compounds already in the set are left
// alone. When several pairs yield the same compound, `TelescopePolicy`
// decides which provenance is kept.
//
// Distances are the grammar engine's alignment cost divided by alignment
// length, +inf for a zero-length alignment, 0 for identical strings. They are
// memoized per ordered pair in a `DistanceCache` owned by the simulation, so
// work done in earlier generations is reused; a pair's distance never
// changes, so entries are never invalidated. The relation need not be
// symmetric.

use glyphic_grammar::GrammarEngine;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Neighbors farther than this are not returned by `closest_prons`.
pub const MAX_DISTANCE: f64 = 0.6;

/// Memoized pairwise distances, keyed by ordered pair.
#[derive(Debug, Default)]
pub struct DistanceCache {
    matrix: FxHashMap<(String, String), f64>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

/// Which provenance to keep when several pairs telescope to one compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelescopePolicy {
    FirstWins,
    #[default]
    LastWins,
}

/// Where a neighbor pronunciation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborSource {
    /// A pronunciation already in the lexicon.
    Single(String),
    /// A compound telescoped from two pronunciations.
    Telescoped { left: String, right: String },
}

impl fmt::Display for NeighborSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborSource::Single(p) => f.write_str(p),
            NeighborSource::Telescoped { left, right } => write!(f, "{left}.{right}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub source: NeighborSource,
    pub cost: f64,
}

/// Neighbor finder over a (telescoped) pronunciation universe.
pub struct PhonologicalDistance<'a, G: GrammarEngine + ?Sized> {
    engine: &'a G,
    cache: &'a mut DistanceCache,
    universe: Vec<String>,
    telescopings: BTreeMap<String, (String, String)>,
}

impl<'a, G: GrammarEngine + ?Sized> PhonologicalDistance<'a, G> {
    pub fn new(
        pronunciations: Vec<String>,
        engine: &'a G,
        cache: &'a mut DistanceCache,
        policy: TelescopePolicy,
    ) -> Self {
        let mut this = Self {
            engine,
            cache,
            universe: pronunciations,
            telescopings: BTreeMap::new(),
        };
        this.telescope(policy);
        this
    }

    fn telescope(&mut self, policy: TelescopePolicy) {
        let known: BTreeSet<&str> = self.universe.iter().map(String::as_str).collect();
        let mut compounds: Vec<String> = Vec::new();
        for p1 in &self.universe {
            let Some(last) = p1.chars().last() else {
                continue;
            };
            if !self.engine.is_vowel(last) {
                continue;
            }
            for p2 in &self.universe {
                let mut rest = p2.chars();
                if rest.next() != Some(last) {
                    continue;
                }
                let compound = format!("{p1}{}", rest.as_str());
                if known.contains(compound.as_str()) {
                    continue;
                }
                let provenance = (p1.clone(), p2.clone());
                match self.telescopings.get_mut(&compound) {
                    Some(existing) => {
                        if policy == TelescopePolicy::LastWins {
                            *existing = provenance;
                        }
                    }
                    None => {
                        self.telescopings.insert(compound.clone(), provenance);
                        compounds.push(compound);
                    }
                }
            }
        }
        self.universe.extend(compounds);
    }

    /// Input pronunciations followed by synthesized compounds.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// The pair a compound was telescoped from, if it was.
    pub fn telescoping(&self, compound: &str) -> Option<(&str, &str)> {
        self.telescopings
            .get(compound)
            .map(|(l, r)| (l.as_str(), r.as_str()))
    }

    /// Replace a telescoped compound by its provenance.
    pub fn expand(&self, pron: &str) -> NeighborSource {
        match self.telescopings.get(pron) {
            Some((left, right)) => NeighborSource::Telescoped {
                left: left.clone(),
                right: right.clone(),
            },
            None => NeighborSource::Single(pron.to_string()),
        }
    }

    /// Memoized weighted distance from `p1` to `p2`.
    pub fn distance(&mut self, p1: &str, p2: &str) -> f64 {
        cached_distance(self.engine, self.cache, p1, p2)
    }

    /// Universe entries within `MAX_DISTANCE` of `pron`, nearest first.
    pub fn closest_prons(&mut self, pron: &str) -> Vec<Neighbor> {
        let mut neighbors = Vec::new();
        for candidate in &self.universe {
            let cost = cached_distance(self.engine, self.cache, pron, candidate);
            if cost <= MAX_DISTANCE {
                neighbors.push(Neighbor {
                    source: self.expand(candidate),
                    cost,
                });
            }
        }
        neighbors.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        neighbors
    }
}

fn cached_distance<G: GrammarEngine + ?Sized>(
    engine: &G,
    cache: &mut DistanceCache,
    p1: &str,
    p2: &str,
) -> f64 {
    if p1 == p2 {
        return 0.0;
    }
    let key = (p1.to_string(), p2.to_string());
    if let Some(cost) = cache.matrix.get(&key) {
        return *cost;
    }
    let cost = engine.phonetic_distance(p1, p2).weighted();
    cache.matrix.insert(key, cost);
    cost
}
