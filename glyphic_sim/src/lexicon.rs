// The lexicon: owner of every morpheme and of the spelling bookkeeping.
//
// Morphemes live in an arena (`Vec<Morpheme>`) addressed by `MorphemeId`.
// Two indices point into it:
// - phonology → morphemes, keyed by each pronunciation (ablaut adds keys for
//   alternative forms). Homophony is expected, so a key holds a list.
// - semantics → morphemes, keyed by the full concept name and by each of its
//   atomic tags, so `KING,MALE` is found under `KING`, `MALE` and
//   `KING,MALE`.
//
// Spelling bookkeeping:
// - `used_spellings`: every rendered spelling ever assigned. Never shrinks.
// - `phonetic_approved`: spellings accepted with a pronunciation source.
//   After `freeze_phonetics()` only these may be borrowed for sound.
// - `semantic_approved`: spellings handed out as semantic candidates while
//   the semantic channel was open. After `freeze_semantics()` only these may
//   be borrowed for meaning.
// Freeze flags are one-way.
//
// All maps are `BTreeMap`/`BTreeSet` so snapshot order and every iteration
// that feeds the PRNG are deterministic.

use crate::types::{Denotation, Morpheme, MorphemeId, Symbol};
use glyphic_grammar::{GrammarEngine, GrammarError};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    morphemes: Vec<Morpheme>,
    phonology_index: BTreeMap<String, Vec<MorphemeId>>,
    /// Phonology keys in the order they were first indexed.
    phonology_order: Vec<String>,
    semantics_index: BTreeMap<String, Vec<MorphemeId>>,
    primaries: BTreeMap<String, MorphemeId>,
    used_spellings: BTreeSet<String>,
    phonetic_approved: BTreeSet<String>,
    semantic_approved: BTreeSet<String>,
    phonetics_frozen: bool,
    semantics_frozen: bool,
}

/// Append `id` under `key` unless it is already there.
fn index_insert(index: &mut BTreeMap<String, Vec<MorphemeId>>, key: &str, id: MorphemeId) {
    let ids = index.entry(key.to_string()).or_default();
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Keep the first symbol for each spelling name.
fn dedup_by_name(symbols: Vec<Symbol>) -> Vec<Symbol> {
    let mut seen = BTreeSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert(s.name().to_string()))
        .collect()
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a morpheme in both indices, record it as its concept's
    /// primary exponent if flagged, and mark its spelling (if any) as used.
    pub fn add_morpheme(&mut self, morpheme: Morpheme) -> MorphemeId {
        let id = MorphemeId(self.morphemes.len());
        self.index_pronunciation(morpheme.phonology(), id);
        let concept = morpheme.concept();
        index_insert(&mut self.semantics_index, concept.name(), id);
        for tag in concept.tags() {
            index_insert(&mut self.semantics_index, tag, id);
        }
        if morpheme.is_primary() {
            self.primaries.insert(concept.name().to_string(), id);
        }
        if let Some(symbol) = morpheme.symbol() {
            self.used_spellings.insert(symbol.spelling());
        }
        self.morphemes.push(morpheme);
        id
    }

    fn index_pronunciation(&mut self, pron: &str, id: MorphemeId) {
        if !self.phonology_index.contains_key(pron) {
            self.phonology_order.push(pron.to_string());
        }
        index_insert(&mut self.phonology_index, pron, id);
    }

    pub fn morpheme(&self, id: MorphemeId) -> &Morpheme {
        &self.morphemes[id.0]
    }

    /// All morphemes, in insertion order.
    pub fn morphemes(&self) -> &[Morpheme] {
        &self.morphemes
    }

    pub fn len(&self) -> usize {
        self.morphemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.morphemes.is_empty()
    }

    /// Morphemes by pronunciation, falling back to meaning.
    pub fn find_morphemes(&self, key: &str) -> Vec<&Morpheme> {
        self.phonology_index
            .get(key)
            .or_else(|| self.semantics_index.get(key))
            .map(|ids| ids.iter().map(|id| self.morpheme(*id)).collect())
            .unwrap_or_default()
    }

    /// The canonical exponent of a concept, by full concept name.
    pub fn primary_exponent(&self, concept: &str) -> Option<&Morpheme> {
        self.primaries.get(concept).map(|id| self.morpheme(*id))
    }

    /// Every pronunciation key, ablauted forms included.
    pub fn pronunciations(&self) -> impl Iterator<Item = &str> {
        self.phonology_index.keys().map(String::as_str)
    }

    /// Pronunciations attached to at least one spelled morpheme.
    pub fn useful_pronunciations(&self) -> Vec<String> {
        self.phonology_index
            .iter()
            .filter(|(_, ids)| ids.iter().any(|id| self.morpheme(*id).is_spelled()))
            .map(|(pron, _)| pron.clone())
            .collect()
    }

    /// Ids of morphemes that have no spelling yet, in insertion order.
    pub fn unspelled(&self) -> Vec<MorphemeId> {
        self.morphemes
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_spelled())
            .map(|(i, _)| MorphemeId(i))
            .collect()
    }

    pub fn spelled_count(&self) -> usize {
        self.morphemes.iter().filter(|m| m.is_spelled()).count()
    }

    pub fn used_spellings(&self) -> &BTreeSet<String> {
        &self.used_spellings
    }

    pub fn is_spelling_used(&self, spelling: &str) -> bool {
        self.used_spellings.contains(spelling)
    }

    pub fn phonetic_approved(&self) -> &BTreeSet<String> {
        &self.phonetic_approved
    }

    pub fn semantic_approved(&self) -> &BTreeSet<String> {
        &self.semantic_approved
    }

    // -----------------------------------------------------------------------
    // Freezing
    // -----------------------------------------------------------------------

    /// Stop admitting new phonetic borrowings. Irreversible.
    pub fn freeze_phonetics(&mut self) {
        self.phonetics_frozen = true;
    }

    /// Stop admitting new semantic borrowings. Irreversible.
    pub fn freeze_semantics(&mut self) {
        self.semantics_frozen = true;
    }

    pub fn phonetics_frozen(&self) -> bool {
        self.phonetics_frozen
    }

    pub fn semantics_frozen(&self) -> bool {
        self.semantics_frozen
    }

    // -----------------------------------------------------------------------
    // Candidate spellings
    // -----------------------------------------------------------------------

    /// Spellings of morphemes pronounced `pron`, re-tagged as phonetic.
    ///
    /// Once phonetics are frozen, only already-approved spellings survive.
    pub fn get_symbols_from_pron(&self, pron: &str) -> Vec<Symbol> {
        let Some(ids) = self.phonology_index.get(pron) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for id in ids {
            let Some(source) = self.morpheme(*id).symbol() else {
                continue;
            };
            let symbol = source.retagged(Denotation::Phonetic(pron.to_string()));
            if self.phonetics_frozen && !self.phonetic_approved.contains(&symbol.spelling()) {
                trace!(spelling = %symbol, "disallowing use as phonetic");
                continue;
            }
            result.push(symbol);
        }
        dedup_by_name(result)
    }

    /// Spellings of morphemes meaning `sem`, re-tagged as semantic.
    ///
    /// While the semantic channel is open, every returned spelling is
    /// recorded as approved; once frozen, only approved spellings survive.
    pub fn get_symbols_from_sem(&mut self, sem: &str) -> Vec<Symbol> {
        let Some(ids) = self.semantics_index.get(sem) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for id in ids {
            let Some(source) = self.morphemes[id.0].symbol() else {
                continue;
            };
            let symbol = source.retagged(Denotation::Semantic(sem.to_string()));
            let spelling = symbol.spelling();
            if self.semantics_frozen && !self.semantic_approved.contains(&spelling) {
                trace!(spelling = %symbol, "disallowing use as semantic");
                continue;
            }
            self.semantic_approved.insert(spelling);
            result.push(symbol);
        }
        dedup_by_name(result)
    }

    /// Give a morpheme its spelling. A `source_pron` marks the spelling as
    /// phonetically motivated, which keeps it usable after a phonetic freeze.
    pub fn assign_spelling(&mut self, id: MorphemeId, symbol: Symbol, source_pron: Option<&str>) {
        let spelling = symbol.spelling();
        self.used_spellings.insert(spelling.clone());
        if source_pron.is_some() {
            self.phonetic_approved.insert(spelling);
        }
        self.morphemes[id.0].set_symbol(symbol);
    }

    // -----------------------------------------------------------------------
    // Ablaut
    // -----------------------------------------------------------------------

    /// Give every morpheme the ablauted variant of its pronunciation key(s)
    /// as an alternative pronunciation, and index it under that variant.
    ///
    /// Keys are visited in the order they were first indexed, so a
    /// morpheme's own pronunciation comes before any form ablaut added.
    /// Each morpheme is processed at most once per pass, so a morpheme that
    /// also sits under an existing ablauted key is not transformed twice.
    /// An empty rule result leaves the form unchanged. Returns the number of
    /// alternatives added.
    pub fn apply_ablaut<G: GrammarEngine + ?Sized>(
        &mut self,
        engine: &G,
    ) -> Result<usize, GrammarError> {
        let keys = self.phonology_order.clone();
        let mut transformed = Vec::with_capacity(keys.len());
        for key in &keys {
            let result = engine.ablaut(key)?;
            transformed.push(if result.is_empty() { key.clone() } else { result });
        }

        let mut visited: BTreeSet<MorphemeId> = BTreeSet::new();
        let mut added = 0;
        for (key, form) in keys.iter().zip(&transformed) {
            let ids = self.phonology_index.get(key).cloned().unwrap_or_default();
            for id in ids {
                if !visited.insert(id) {
                    continue;
                }
                if self.morphemes[id.0].add_alternative(form) {
                    added += 1;
                }
                self.index_pronunciation(form, id);
            }
        }
        debug!(keys = keys.len(), added, "applied ablaut");
        Ok(added)
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Write the snapshot table: `pron<TAB>symbol<TAB>morpheme` per line, one
    /// line per (pronunciation key, morpheme) pair.
    pub fn dump_morphemes<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (pron, ids) in &self.phonology_index {
            for id in ids {
                let m = self.morpheme(*id);
                writeln!(out, "{}\t{}\t{}", pron, m.symbol_name(), m)?;
            }
        }
        Ok(())
    }

    /// Write the bare pronunciation keys, one per line.
    pub fn write_morphs<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for pron in self.pronunciations() {
            writeln!(out, "{pron}")?;
        }
        Ok(())
    }

    /// `(spelling, pronunciation)` for every spelled morpheme under every key.
    pub fn pron_to_symbol_map(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (pron, ids) in &self.phonology_index {
            for id in ids {
                if let Some(symbol) = self.morpheme(*id).symbol() {
                    pairs.push((symbol.spelling(), pron.clone()));
                }
            }
        }
        pairs
    }

    /// Write the audit log: `SYMBOL:<TAB>spelling<TAB>pron` per line.
    pub fn write_symbol_audit<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (spelling, pron) in self.pron_to_symbol_map() {
            writeln!(out, "SYMBOL:\t{spelling}\t{pron}")?;
        }
        Ok(())
    }
}

/// A primary morpheme spelled with its concept's glyph.
#[cfg(test)]
pub(crate) fn primary_with_glyph(pron: &str, concept: &str, glyph: &str) -> Morpheme {
    let concept = crate::types::Concept::new(concept);
    let symbol = Symbol::new(glyph, Denotation::Semantic(concept.name().to_string()));
    Morpheme::new(pron, concept, Some(symbol), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Concept;
    use glyphic_grammar::TableGrammar;

    fn unspelled(pron: &str, concept: &str) -> Morpheme {
        Morpheme::new(pron, Concept::new(concept), None, false)
    }

    #[test]
    fn find_morphemes_by_tag_full_name_and_pron() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("ka", "KING,MALE", "♔"));
        assert_eq!(lex.find_morphemes("KING").len(), 1);
        assert_eq!(lex.find_morphemes("MALE").len(), 1);
        assert_eq!(lex.find_morphemes("KING,MALE").len(), 1);
        assert_eq!(lex.find_morphemes("ka").len(), 1);
        assert!(lex.find_morphemes("QUEEN").is_empty());
        assert_eq!(lex.find_morphemes("KING")[0].phonology(), "ka");
    }

    #[test]
    fn homophones_share_a_key() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(unspelled("pa", "SUN"));
        lex.add_morpheme(unspelled("pa", "MOON"));
        assert_eq!(lex.find_morphemes("pa").len(), 2);
        assert_eq!(lex.pronunciations().count(), 1);
    }

    #[test]
    fn pronunciation_key_takes_precedence_over_meaning() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(unspelled("SUN", "MOON"));
        lex.add_morpheme(unspelled("pa", "SUN"));
        let found = lex.find_morphemes("SUN");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].concept().name(), "MOON");
    }

    #[test]
    fn add_records_primary_and_used_spelling() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        lex.add_morpheme(unspelled("pi", "SUN"));
        assert_eq!(lex.primary_exponent("SUN").unwrap().phonology(), "pa");
        assert!(lex.primary_exponent("MOON").is_none());
        assert!(lex.is_spelling_used("{☉}[SUN]"));
        assert_eq!(lex.used_spellings().len(), 1);
    }

    #[test]
    fn useful_pronunciations_need_a_spelled_morpheme() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        lex.add_morpheme(unspelled("ti", "MOON"));
        assert_eq!(lex.useful_pronunciations(), vec!["pa".to_string()]);
        assert_eq!(lex.unspelled(), vec![MorphemeId(1)]);
    }

    #[test]
    fn symbols_from_pron_are_phonetic_and_deduplicated() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        lex.add_morpheme(primary_with_glyph("pa", "STAR", "☉"));
        lex.add_morpheme(unspelled("pa", "MOON"));
        let symbols = lex.get_symbols_from_pron("pa");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].spelling(), "{☉}(pa)");
        assert!(lex.get_symbols_from_pron("zz").is_empty());
    }

    #[test]
    fn symbols_from_sem_record_semantic_approval() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("ka", "KING", "♔"));
        let symbols = lex.get_symbols_from_sem("KING");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].spelling(), "{♔}[KING]");
        assert!(lex.semantic_approved().contains("{♔}[KING]"));
    }

    #[test]
    fn phonetic_freeze_keeps_only_approved_spellings() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        let target = lex.add_morpheme(unspelled("pi", "SUN"));
        let pa = lex.get_symbols_from_pron("pa").remove(0);
        lex.assign_spelling(target, pa, Some("pa"));
        lex.freeze_phonetics();
        // `{☉}(pa)` was approved; `{☉}(pi)` never was.
        assert_eq!(lex.get_symbols_from_pron("pa").len(), 1);
        assert!(lex.get_symbols_from_pron("pi").is_empty());
        assert!(lex.phonetics_frozen());
    }

    #[test]
    fn semantic_freeze_keeps_only_circulated_spellings() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        lex.add_morpheme(primary_with_glyph("ka", "KING", "♔"));
        assert_eq!(lex.get_symbols_from_sem("SUN").len(), 1);
        lex.freeze_semantics();
        assert_eq!(lex.get_symbols_from_sem("SUN").len(), 1);
        assert!(lex.get_symbols_from_sem("KING").is_empty());
    }

    #[test]
    fn ablaut_adds_alternatives_and_keys() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(unspelled("pa", "SUN"));
        lex.add_morpheme(unspelled("pa", "MOON"));
        lex.add_morpheme(unspelled("tu", "STAR"));
        let engine = TableGrammar::new("aou").with_ablaut("pa", "po");
        let added = lex.apply_ablaut(&engine).unwrap();
        assert_eq!(added, 2);
        assert_eq!(lex.find_morphemes("po").len(), 2);
        assert_eq!(lex.morpheme(MorphemeId(0)).alternatives(), ["po"]);
        // No rule for `tu`: the form is kept, nothing erased or added.
        assert!(lex.morpheme(MorphemeId(2)).alternatives().is_empty());
        assert_eq!(lex.find_morphemes("tu").len(), 1);
    }

    #[test]
    fn ablaut_skips_morphemes_already_processed_in_the_pass() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(unspelled("pa", "SUN"));
        lex.add_morpheme(unspelled("po", "MOON"));
        let engine = TableGrammar::new("aou")
            .with_ablaut("pa", "po")
            .with_ablaut("po", "pu");
        lex.apply_ablaut(&engine).unwrap();
        // `pa` moved under `po` but was not ablauted a second time to `pu`.
        assert_eq!(lex.morpheme(MorphemeId(0)).alternatives(), ["po"]);
        assert_eq!(lex.morpheme(MorphemeId(1)).alternatives(), ["pu"]);
        assert_eq!(lex.find_morphemes("po").len(), 2);
    }

    #[test]
    fn ablaut_twice_does_not_duplicate_alternatives() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(unspelled("pa", "SUN"));
        let engine = TableGrammar::new("aou").with_ablaut("pa", "po");
        lex.apply_ablaut(&engine).unwrap();
        lex.apply_ablaut(&engine).unwrap();
        assert_eq!(lex.morpheme(MorphemeId(0)).alternatives(), ["po"]);
        assert_eq!(lex.find_morphemes("po").len(), 1);
    }

    #[test]
    fn repeated_ablaut_starts_from_the_original_pronunciation() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(unspelled("pu", "SUN"));
        let engine = TableGrammar::new("aou")
            .with_ablaut("pu", "pa")
            .with_ablaut("pa", "po");
        lex.apply_ablaut(&engine).unwrap();
        // `pa` sorts before `pu`, but `pu` was indexed first and claims the
        // morpheme for the pass.
        let added = lex.apply_ablaut(&engine).unwrap();
        assert_eq!(added, 0);
        assert_eq!(lex.morpheme(MorphemeId(0)).alternatives(), ["pa"]);
        assert!(lex.find_morphemes("po").is_empty());
    }

    #[test]
    fn dump_writes_one_line_per_key_and_morpheme() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        lex.add_morpheme(unspelled("ti", "MOON"));
        let mut out = Vec::new();
        lex.dump_morphemes(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "pa\t\x1b[34m☉\x1b[0m\t{pa:SUN:<{☉}[SUN]:☉:S>:1}"
        );
        assert_eq!(lines[1], "ti\t<NO_SYMBOL>\t{ti:MOON::0}");
    }

    #[test]
    fn audit_lists_spelled_morphemes() {
        let mut lex = Lexicon::new();
        lex.add_morpheme(primary_with_glyph("pa", "SUN", "☉"));
        lex.add_morpheme(unspelled("ti", "MOON"));
        let mut out = Vec::new();
        lex.write_symbol_audit(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "SYMBOL:\t{☉}[SUN]\tpa\n");
        let mut morphs = Vec::new();
        lex.write_morphs(&mut morphs).unwrap();
        assert_eq!(String::from_utf8(morphs).unwrap(), "pa\nti\n");
    }
}
