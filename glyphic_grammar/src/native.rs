// Production grammar engine driven by a `GrammarArchive`.
//
// Morph generation walks a template slot by slot, drawing each segment
// uniformly from the slot's phoneme class. Phonetic distance is a weighted
// edit distance: the cheapest alignment is found by dynamic programming and
// both its cost and its length (number of steps, matches included) are
// reported, so the caller can normalize cost per aligned segment. Ablaut
// rewrites the last vowel of a form with the first matching rewrite of the
// rule; a form whose last vowel has no rewrite yields the empty string.
//
// The distance rule is resolved at construction. Templates and the ablaut
// rule are resolved per call, so a run that never asks for ablaut does not
// need the archive to carry one.

use crate::archive::{DistanceRule, GrammarArchive, is_vowel_class};
use crate::error::GrammarError;
use crate::{EditDistance, GrammarEngine};
use glyphic_prng::SimRng;
use std::collections::BTreeSet;
use tracing::debug;

/// Attempts at drawing a non-empty form from a template made of optional slots.
const MAX_EMPTY_REDRAWS: usize = 8;

/// Grammar engine backed by an archive.
#[derive(Debug, Clone)]
pub struct NativeGrammar {
    archive: GrammarArchive,
    distance: DistanceRule,
    ablaut_rule: String,
    vowels: BTreeSet<char>,
}

impl NativeGrammar {
    /// Build an engine, resolving the distance rule up front.
    pub fn new(
        archive: GrammarArchive,
        distance_rule: &str,
        ablaut_rule: &str,
    ) -> Result<Self, GrammarError> {
        let distance = archive.distance_rule(distance_rule)?.clone();
        let vowels = archive
            .phonemes
            .iter()
            .filter(|p| is_vowel_class(&p.class))
            .map(|p| p.symbol)
            .collect();
        debug!(
            archive = %archive.label,
            phonemes = archive.phonemes.len(),
            templates = archive.templates.len(),
            "loaded grammar archive"
        );
        Ok(Self {
            archive,
            distance,
            ablaut_rule: ablaut_rule.to_string(),
            vowels,
        })
    }

    /// The embedded archive with the default rule names.
    pub fn embedded() -> Result<Self, GrammarError> {
        Self::new(
            GrammarArchive::embedded(),
            crate::DEFAULT_DISTANCE_RULE,
            crate::DEFAULT_ABLAUT_RULE,
        )
    }

    fn substitution_cost(&self, from: char, to: char) -> f64 {
        if from == to {
            return 0.0;
        }
        if let Some(pair) = self
            .distance
            .pairs
            .iter()
            .find(|p| p.from == from && p.to == to)
        {
            return pair.cost;
        }
        match (self.archive.class_of(from), self.archive.class_of(to)) {
            (Some(a), Some(b)) if a == b => self.distance.same_class_substitution,
            _ => self.distance.substitution,
        }
    }

    /// Cheapest alignment of `a` onto `b`, ties broken by fewer steps.
    fn align(&self, a: &[char], b: &[char]) -> EditDistance {
        if a.is_empty() && b.is_empty() {
            return EditDistance::UNREACHABLE;
        }
        let width = b.len() + 1;
        // (cost, steps) per cell.
        let mut table = vec![(0.0f64, 0usize); (a.len() + 1) * width];
        for i in 1..=a.len() {
            let (cost, steps) = table[(i - 1) * width];
            table[i * width] = (cost + self.distance.deletion, steps + 1);
        }
        for j in 1..=b.len() {
            let (cost, steps) = table[j - 1];
            table[j] = (cost + self.distance.insertion, steps + 1);
        }
        for i in 1..=a.len() {
            for j in 1..=b.len() {
                let diag = table[(i - 1) * width + (j - 1)];
                let up = table[(i - 1) * width + j];
                let left = table[i * width + (j - 1)];
                let options = [
                    (diag.0 + self.substitution_cost(a[i - 1], b[j - 1]), diag.1 + 1),
                    (up.0 + self.distance.deletion, up.1 + 1),
                    (left.0 + self.distance.insertion, left.1 + 1),
                ];
                let mut best = options[0];
                for option in &options[1..] {
                    if option.0 < best.0 || (option.0 == best.0 && option.1 < best.1) {
                        best = *option;
                    }
                }
                table[i * width + j] = best;
            }
        }
        let (cost, edits) = table[a.len() * width + b.len()];
        EditDistance { edits, cost }
    }
}

impl GrammarEngine for NativeGrammar {
    fn generate_morphs(
        &self,
        template: &str,
        n: usize,
        rng: &mut SimRng,
    ) -> Result<Vec<String>, GrammarError> {
        let slots: Vec<(Vec<char>, bool)> = self
            .archive
            .template(template)?
            .iter()
            .map(|slot| {
                let optional = slot.ends_with('?');
                let class = slot.trim_end_matches('?');
                (self.archive.class_members(class), optional)
            })
            .collect();

        let mut morphs = Vec::with_capacity(n);
        for _ in 0..n {
            let mut morph = String::new();
            for _ in 0..MAX_EMPTY_REDRAWS {
                for (members, optional) in &slots {
                    if *optional && !rng.random_bool(0.5) {
                        continue;
                    }
                    if let Some(segment) = rng.choose(members) {
                        morph.push(*segment);
                    }
                }
                if !morph.is_empty() {
                    break;
                }
            }
            morphs.push(morph);
        }
        Ok(morphs)
    }

    fn phonetic_distance(&self, s1: &str, s2: &str) -> EditDistance {
        let a: Vec<char> = s1.chars().collect();
        let b: Vec<char> = s2.chars().collect();
        self.align(&a, &b)
    }

    fn ablaut(&self, pron: &str) -> Result<String, GrammarError> {
        let rule = self.archive.ablaut_rule(&self.ablaut_rule)?;
        let mut chars: Vec<char> = pron.chars().collect();
        let Some(pos) = chars.iter().rposition(|c| self.vowels.contains(c)) else {
            return Ok(String::new());
        };
        match rule.iter().find(|r| r.from == chars[pos]) {
            Some(rewrite) => {
                chars[pos] = rewrite.to;
                Ok(chars.into_iter().collect())
            }
            None => Ok(String::new()),
        }
    }

    fn is_vowel(&self, phoneme: char) -> bool {
        self.vowels.contains(&phoneme)
    }
}
