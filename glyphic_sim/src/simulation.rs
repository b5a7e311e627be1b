// Simulation driver: setup, the generation loop, and run output.
//
// A `Simulation` is the whole session. It owns the config, the grammar
// engine, the lexicon, the distance cache and the PRNG; nothing is global, so
// two simulations never observe each other and a fresh `Simulation` is a full
// reset.
//
// Setup (`new()`): validate the config, seed the PRNG from `config.seed`,
// build the generation-0 lexicon (`builder.rs`), then run one ablaut pass if
// `config.ablaut` is set.
//
// Each `step()` advances one generation. Freezes are applied first, when the
// new generation number equals `freeze_phonetics_at_iter` or
// `freeze_semantics_at_iter`, then the spelling pass runs.
//
// `run()` drives a full batch:
//
//   1. create `outdir` if missing
//   2. write `morphemes_0000.tsv` (the lexicon after setup)
//   3. for generation in 1..niter: step, write `morphemes_NNNN.tsv`
//   4. write `symbols.txt` (the pronunciation→symbol audit)
//   5. write `summary.json` and return the same `RunSummary`
//
// Snapshot lines are `pron<TAB>symbol<TAB>morpheme`; see
// `Lexicon::dump_morphemes`.

use crate::builder::build_lexicon;
use crate::concepts::ConceptInventory;
use crate::config::SimConfig;
use crate::distance::DistanceCache;
use crate::error::SimError;
use crate::lexicon::Lexicon;
use crate::spelling::{GenerationReport, SpellingAssignmentEngine};
use glyphic_grammar::GrammarEngine;
use glyphic_prng::SimRng;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the audit file written at the end of a run.
pub const SYMBOLS_FILE: &str = "symbols.txt";
/// Name of the JSON run summary.
pub const SUMMARY_FILE: &str = "summary.json";

/// Snapshot file name for a generation: `morphemes_0003.tsv`.
pub fn snapshot_name(generation: usize) -> String {
    format!("morphemes_{generation:04}.tsv")
}

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    /// Generations run after setup.
    pub generations: usize,
    pub morphemes: usize,
    pub spelled: usize,
    pub used_spellings: usize,
    pub phonetics_frozen: bool,
    pub semantics_frozen: bool,
    pub reports: Vec<GenerationReport>,
}

pub struct Simulation<G: GrammarEngine> {
    config: SimConfig,
    engine: G,
    lexicon: Lexicon,
    cache: DistanceCache,
    rng: SimRng,
    spelling: SpellingAssignmentEngine,
    generation: usize,
    reports: Vec<GenerationReport>,
}

impl<G: GrammarEngine> Simulation<G> {
    /// Set up a session: validated config, generation-0 lexicon, optional
    /// ablaut pass.
    pub fn new(config: SimConfig, engine: G, inventory: &ConceptInventory) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = SimRng::new(config.seed);
        let mut lexicon = build_lexicon(&engine, inventory, &config, &mut rng)?;
        info!(
            morphemes = lexicon.len(),
            spelled = lexicon.spelled_count(),
            base_morph = %config.base_morph,
            "built initial lexicon"
        );
        if config.ablaut {
            let added = lexicon.apply_ablaut(&engine)?;
            info!(added, "applied ablaut");
        }
        let spelling = SpellingAssignmentEngine::from_config(&config);
        Ok(Self {
            config,
            engine,
            lexicon,
            cache: DistanceCache::new(),
            rng,
            spelling,
            generation: 0,
            reports: Vec::new(),
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// The last generation run; 0 right after setup.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn reports(&self) -> &[GenerationReport] {
        &self.reports
    }

    /// Advance one generation.
    pub fn step(&mut self) -> &GenerationReport {
        self.generation += 1;
        let generation = self.generation;
        if self.config.freeze_phonetics_at_iter == generation {
            self.lexicon.freeze_phonetics();
            info!(generation, "froze phonetics");
        }
        if self.config.freeze_semantics_at_iter == generation {
            self.lexicon.freeze_semantics();
            info!(generation, "froze semantics");
        }
        let report = self.spelling.run_generation(
            generation,
            &mut self.lexicon,
            &self.engine,
            &mut self.cache,
            &mut self.rng,
        );
        info!(
            generation,
            attempted = report.attempted,
            spelled = report.spelled,
            reused = report.reused,
            total_spelled = self.lexicon.spelled_count(),
            "generation done"
        );
        self.reports.push(report);
        &self.reports[self.reports.len() - 1]
    }

    /// Run generations `1..niter`, writing every snapshot and the audit
    /// under `outdir`.
    pub fn run(&mut self) -> Result<RunSummary, SimError> {
        let outdir = self.config.outdir.clone();
        std::fs::create_dir_all(&outdir).map_err(|e| SimError::io(&outdir, e))?;
        info!(outdir = %outdir.display(), niter = self.config.niter, "starting run");

        self.write_snapshot(&outdir)?;
        while self.generation + 1 < self.config.niter {
            self.step();
            self.write_snapshot(&outdir)?;
        }

        let audit = outdir.join(SYMBOLS_FILE);
        write_file(&audit, |out| self.lexicon.write_symbol_audit(out))?;

        let summary = self.summary();
        let path = outdir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(&summary).map_err(|e| SimError::json(&path, e))?;
        std::fs::write(&path, json).map_err(|e| SimError::io(&path, e))?;
        info!(
            spelled = summary.spelled,
            morphemes = summary.morphemes,
            "run complete"
        );
        Ok(summary)
    }

    /// Write the current lexicon to `dir/morphemes_NNNN.tsv`.
    pub fn write_snapshot(&self, dir: &Path) -> Result<PathBuf, SimError> {
        let path = dir.join(snapshot_name(self.generation));
        write_file(&path, |out| self.lexicon.dump_morphemes(out))?;
        Ok(path)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.config.seed,
            generations: self.generation,
            morphemes: self.lexicon.len(),
            spelled: self.lexicon.spelled_count(),
            used_spellings: self.lexicon.used_spellings().len(),
            phonetics_frozen: self.lexicon.phonetics_frozen(),
            semantics_frozen: self.lexicon.semantics_frozen(),
            reports: self.reports.clone(),
        }
    }
}

fn write_file<F>(path: &Path, body: F) -> Result<(), SimError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| SimError::io(path, e))?;
    let mut out = BufWriter::new(file);
    body(&mut out)
        .and_then(|()| out.flush())
        .map_err(|e| SimError::io(path, e))
}
