// Run configuration.
//
// All tunable parameters of a simulation run live in `SimConfig`, loaded
// from JSON. Every field has a default, so a config file only needs the
// fields it changes (`{}` is a valid config). Defaults reproduce the classic
// setup: 1000 monosyllabic morphs, 5 iterations, a 0.3 chance per generation
// of seeking a spelling, no freezing, no ablaut.
//
// Freeze iterations count from 1, the first generation of the main loop, so
// the default of 0 means "never freeze".
//
// See also: `simulation.rs`, which consumes the config, and `spelling.rs` for
// the probabilities.

use crate::distance::TelescopePolicy;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Run one ablaut pass after setup.
    pub ablaut: bool,
    /// Name of the base-morph template in the grammar archive.
    pub base_morph: String,
    /// Number of generations including the initial state; the main loop
    /// runs generations `1..niter`.
    pub niter: usize,
    /// Number of morphs to generate.
    pub nmorphs: usize,
    /// Directory receiving snapshots and the symbol audit.
    pub outdir: PathBuf,
    /// Chance that an unspelled morpheme seeks a spelling in a generation.
    pub probability_to_seek_spelling: f64,
    /// Chance of accepting a candidate whose spelling is already in use.
    pub probability_to_reuse_spelling: f64,
    /// Generation at which the phonetic channel freezes (0 = never).
    pub freeze_phonetics_at_iter: usize,
    /// Generation at which the semantic channel freezes (0 = never).
    pub freeze_semantics_at_iter: usize,
    /// Whether non-primary exponents of a base concept start with its glyph.
    pub initialize_non_primaries_with_symbol: bool,
    /// PRNG seed for the whole run.
    pub seed: u64,
    /// Tie-break for compounds reachable by several telescopings.
    pub telescope_policy: TelescopePolicy,
    /// Grammar archive path; the embedded archive when absent.
    pub grammar: Option<PathBuf>,
    /// Concept inventory path; the embedded inventory when absent.
    pub concepts: Option<PathBuf>,
    /// Phonetic-similarity rule in the grammar archive.
    pub distance_rule: String,
    /// Ablaut rule in the grammar archive.
    pub ablaut_rule: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ablaut: false,
            base_morph: glyphic_grammar::DEFAULT_TEMPLATE.to_string(),
            niter: 5,
            nmorphs: 1000,
            outdir: PathBuf::from("/var/tmp/simulation"),
            probability_to_seek_spelling: 0.3,
            probability_to_reuse_spelling: 0.01,
            freeze_phonetics_at_iter: 0,
            freeze_semantics_at_iter: 0,
            initialize_non_primaries_with_symbol: false,
            seed: 0,
            telescope_policy: TelescopePolicy::LastWins,
            grammar: None,
            concepts: None,
            distance_rule: glyphic_grammar::DEFAULT_DISTANCE_RULE.to_string(),
            ablaut_rule: glyphic_grammar::DEFAULT_ABLAUT_RULE.to_string(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a config file and validate it.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        let config = Self::from_json(&json).map_err(|e| SimError::json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        for (name, p) in [
            (
                "probability_to_seek_spelling",
                self.probability_to_seek_spelling,
            ),
            (
                "probability_to_reuse_spelling",
                self.probability_to_reuse_spelling,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        if self.niter == 0 {
            return Err(SimError::InvalidConfig("niter must be at least 1".into()));
        }
        if self.base_morph.is_empty() {
            return Err(SimError::InvalidConfig("base_morph must not be empty".into()));
        }
        Ok(())
    }
}
