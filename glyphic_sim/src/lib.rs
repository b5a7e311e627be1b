// glyphic_sim: simulation of an emerging writing system.
//
// Over successive generations, morphemes (pronunciation + meaning pairs)
// acquire written symbols borrowed from morphemes that already have one:
// for sound (rebus-like phonetic borrowing), for meaning (ideographic reuse),
// or both at once. Which channel wins, and how often spellings get reused,
// is the emergent behavior being studied.
//
// Module overview:
// - `types.rs`:      Concept, Denotation, SymbolType, Symbol, MorphemeId, Morpheme.
// - `lexicon.rs`:    Lexicon, morpheme arena, sound/meaning indices, spelling
//                    bookkeeping, freeze flags, ablaut, snapshot output.
// - `distance.rs`:   PhonologicalDistance, telescoping and nearest
//                    pronunciations over a shared DistanceCache.
// - `spelling.rs`:   SpellingAssignmentEngine, the per-generation pass.
// - `builder.rs`:    Generation-0 lexicon from the grammar and concept inventory.
// - `concepts.rs`:   ConceptInventory, base concepts and their glyphs.
// - `config.rs`:     SimConfig, every tunable parameter, JSON-loadable.
// - `simulation.rs`: Simulation, session object, generation loop, run output.
// - `error.rs`:      SimError.
// - `grammar`, `prng`: re-exported from `glyphic_grammar` and `glyphic_prng`.
//
// **Determinism.** All randomness comes from one seeded `SimRng` owned by the
// `Simulation`, consumed in a fixed order. Every map that is iterated while
// drawing from it is a `BTreeMap`/`BTreeSet`; the only hash map is the
// distance cache, which is never iterated.

pub mod builder;
pub mod concepts;
pub mod config;
pub mod distance;
pub mod error;
pub mod lexicon;
pub mod simulation;
pub mod spelling;
pub mod types;

pub use glyphic_grammar as grammar;
pub use glyphic_prng as prng;

pub use concepts::ConceptInventory;
pub use config::SimConfig;
pub use error::SimError;
pub use lexicon::Lexicon;
pub use simulation::{RunSummary, Simulation};
