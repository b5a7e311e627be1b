// Command-line entry point for the glyphic simulation.
//
// Usage: glyphic [config.json] [--seed N] [--outdir DIR] [--niter N]
//
// With no config file every `SimConfig` default applies. The flags override
// the matching config fields. Grammar and concept inventory come from the
// paths named in the config, or the embedded defaults. Any setup or I/O
// failure is printed and the process exits with status 1.

use glyphic_sim::grammar::{GrammarArchive, NativeGrammar};
use glyphic_sim::{ConceptInventory, SimConfig, SimError, Simulation};
use std::path::{Path, PathBuf};
use tracing::Level;

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), SimError> {
    let config_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(PathBuf::from);
    let mut config = match &config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = parse_flag(args, "--seed") {
        config.seed = seed;
    }
    if let Some(outdir) = parse_flag::<String>(args, "--outdir") {
        config.outdir = PathBuf::from(outdir);
    }
    if let Some(niter) = parse_flag(args, "--niter") {
        config.niter = niter;
    }

    println!("=== Glyphic writing-system simulation ===");
    println!("Base morph: {}", config.base_morph);
    println!("Morphs: {}", config.nmorphs);
    println!("Iterations: {}", config.niter);
    println!(
        "Probability to seek spelling: {}",
        config.probability_to_seek_spelling
    );
    println!(
        "Initialize non-primaries with symbol: {}",
        config.initialize_non_primaries_with_symbol
    );
    println!("Apply ablaut: {}", config.ablaut);
    println!("Seed: {}", config.seed);
    println!("Output: {}", config.outdir.display());

    let archive = match &config.grammar {
        Some(path) => GrammarArchive::load(path)?,
        None => GrammarArchive::embedded(),
    };
    let engine = NativeGrammar::new(archive, &config.distance_rule, &config.ablaut_rule)?;
    let inventory = load_inventory(config.concepts.as_deref())?;

    let mut sim = Simulation::new(config, engine, &inventory)?;
    let summary = sim.run()?;
    println!(
        "Spelled {} of {} morphemes after {} generations ({} distinct spellings)",
        summary.spelled, summary.morphemes, summary.generations, summary.used_spellings
    );
    Ok(())
}

fn load_inventory(path: Option<&Path>) -> Result<ConceptInventory, SimError> {
    match path {
        Some(path) => ConceptInventory::load(path),
        None => Ok(ConceptInventory::embedded()),
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
