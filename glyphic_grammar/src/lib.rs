// Phonological grammar engine for the glyphic simulation.
//
// The spelling simulation needs exactly four things from a phonological
// grammar: sample pronunciations from a named morph template, score how much
// two pronunciations sound alike, apply an ablaut rule to a pronunciation,
// and tell vowels from consonants. `GrammarEngine` is that port. Everything
// else about how a grammar is authored stays behind it.
//
// Architecture:
// - `archive.rs`: `GrammarArchive`, the JSON grammar archive (phoneme
//   inventory, morph templates, edit-distance rules, ablaut rules)
// - `native.rs`: `NativeGrammar`, the production adapter driven by an archive
// - `table.rs`: `TableGrammar`, a deterministic table-driven engine for tests
// - `error.rs`: `GrammarError`, fail-fast configuration errors
//
// The default archive is embedded at compile time from `data/grammar.json`,
// following the same `include_str!` pattern as the concept inventory in
// `glyphic_sim`.
//
// Determinism constraint: all sampling goes through `glyphic_prng::SimRng`.

pub mod archive;
pub mod error;
pub mod native;
pub mod table;

pub use archive::GrammarArchive;
pub use error::GrammarError;
pub use native::NativeGrammar;
pub use table::TableGrammar;

use glyphic_prng::SimRng;

/// Name of the default base-morph template.
pub const DEFAULT_TEMPLATE: &str = "MONOSYLLABLE";
/// Name of the default phonetic-similarity rule.
pub const DEFAULT_DISTANCE_RULE: &str = "EDIT_DISTANCE";
/// Name of the default ablaut rule.
pub const DEFAULT_ABLAUT_RULE: &str = "ABLAUT";

/// Result of aligning two pronunciations along their cheapest path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDistance {
    /// Number of alignment steps on the cheapest path (matches included).
    pub edits: usize,
    /// Accumulated cost along that path.
    pub cost: f64,
}

impl EditDistance {
    /// The "no alignment" result: zero steps, infinite cost.
    pub const UNREACHABLE: EditDistance = EditDistance {
        edits: 0,
        cost: f64::INFINITY,
    };

    /// Cost per alignment step, or +inf when there were no steps.
    pub fn weighted(&self) -> f64 {
        if self.edits == 0 {
            f64::INFINITY
        } else {
            self.cost / self.edits as f64
        }
    }
}

/// The narrow port the simulation consumes.
///
/// Calls are synchronous and may be costly; callers memoize distances
/// themselves.
pub trait GrammarEngine {
    /// Sample `n` pronunciations from the named base-morph template.
    fn generate_morphs(
        &self,
        template: &str,
        n: usize,
        rng: &mut SimRng,
    ) -> Result<Vec<String>, GrammarError>;

    /// Align `s1` against `s2` under the phonetic-similarity rule.
    ///
    /// Not necessarily symmetric.
    fn phonetic_distance(&self, s1: &str, s2: &str) -> EditDistance;

    /// Apply the ablaut rule. An empty string means no rule applied.
    fn ablaut(&self, pron: &str) -> Result<String, GrammarError>;

    /// Whether the phoneme belongs to the vowel inventory.
    fn is_vowel(&self, phoneme: char) -> bool;
}
