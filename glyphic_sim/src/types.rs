// Core data model: concepts, symbols and morphemes.
//
// The type hierarchy is:
// - `Concept`: a meaning, one or more comma-joined semantic tags
// - `Denotation`: what a symbol stands for: a sound, a meaning, or both
// - `SymbolType`: S / P / SP, derived from the denotation variant alone
// - `Symbol`: a spelling (one or more glyphs plus display markup) and its
//   denotation
// - `MorphemeId`: stable index of a morpheme in the lexicon arena
// - `Morpheme`: a pronunciation paired with a concept, optionally spelled
//
// Rendered spellings look like `{♔}[KING]` (semantic), `{♔}(pa)` (phonetic)
// or `{{♔}[KING]{☉}(pa)}[KING+pa]` (composite). The rendered string is the
// identity used by the lexicon's used/approved spelling sets. Only non-ASCII
// characters are glyphs; braces, brackets and denotation text are markup.
//
// Every symbol also carries an ANSI-colored display name: blue when the
// glyphs are used for meaning, red when used for sound.

use std::fmt;

const BLUE: &str = "\x1b[34m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Strip the display colors from a string.
pub fn clean_colors(s: &str) -> String {
    s.replace(BLUE, "").replace(RED, "").replace(RESET, "")
}

/// Recolor a string as phonetic (red).
pub fn phonetic_color(s: &str) -> String {
    format!("{RED}{}{RESET}", clean_colors(s))
}

/// Recolor a string as semantic (blue).
pub fn semantic_color(s: &str) -> String {
    format!("{BLUE}{}{RESET}", clean_colors(s))
}

// ---------------------------------------------------------------------------
// Concept
// ---------------------------------------------------------------------------

/// A meaning, named by comma-joined primitive tags such as `KING,MALE`.
///
/// Tag order carries no meaning but is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Concept {
    name: String,
    tags: Vec<String>,
}

impl Concept {
    /// Parse a comma-joined name. Whitespace around tags and empty tags are
    /// dropped.
    pub fn new(name: &str) -> Self {
        Self::from_tags(name.split(','))
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            name: tags.join(","),
            tags,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The atomic tags, in display order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_composite(&self) -> bool {
        self.tags.len() > 1
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// What a symbol is motivated by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denotation {
    /// A semantic tag or a comma-joined composite concept name.
    Semantic(String),
    /// A pronunciation, or a telescoped `p1.p2` provenance.
    Phonetic(String),
    /// A semantic part and a phonetic part.
    Composite { semantic: String, phonetic: String },
}

impl Denotation {
    /// Plain text of the denotation: `KING`, `pa`, `KING+pa`.
    pub fn text(&self) -> String {
        match self {
            Denotation::Semantic(s) | Denotation::Phonetic(s) => s.clone(),
            Denotation::Composite { semantic, phonetic } => format!("{semantic}+{phonetic}"),
        }
    }

    pub fn symbol_type(&self) -> SymbolType {
        match self {
            Denotation::Semantic(_) => SymbolType::Semantic,
            Denotation::Phonetic(_) => SymbolType::Phonetic,
            Denotation::Composite { .. } => SymbolType::SemPhon,
        }
    }
}

impl fmt::Display for Denotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denotation::Semantic(s) => write!(f, "[{s}]"),
            Denotation::Phonetic(p) => write!(f, "({p})"),
            Denotation::Composite { semantic, phonetic } => write!(f, "[{semantic}+{phonetic}]"),
        }
    }
}

/// Classification of a symbol by its denotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Semantic,
    Phonetic,
    SemPhon,
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolType::Semantic => "S",
            SymbolType::Phonetic => "P",
            SymbolType::SemPhon => "SP",
        })
    }
}

/// A spelling together with what it denotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    name: String,
    denotation: Denotation,
    colored_name: String,
}

impl Symbol {
    /// A symbol spelled `name`, colored by the denotation's channel.
    pub fn new(name: impl Into<String>, denotation: Denotation) -> Self {
        let name = name.into();
        let colored_name = match denotation {
            Denotation::Semantic(_) => semantic_color(&name),
            _ => phonetic_color(&name),
        };
        Self {
            name,
            denotation,
            colored_name,
        }
    }

    /// The spelling without the denotation suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn denotation(&self) -> &Denotation {
        &self.denotation
    }

    pub fn colored_name(&self) -> &str {
        &self.colored_name
    }

    pub fn symbol_type(&self) -> SymbolType {
        self.denotation.symbol_type()
    }

    /// The rendered spelling, used as the key of the spelling sets.
    pub fn spelling(&self) -> String {
        self.to_string()
    }

    /// Just the glyphs: the non-ASCII characters of the rendered spelling.
    pub fn glyphs(&self) -> String {
        self.spelling().chars().filter(|c| !c.is_ascii()).collect()
    }

    /// Number of glyphs. Markup does not count.
    pub fn glyph_count(&self) -> usize {
        self.spelling().chars().filter(|c| !c.is_ascii()).count()
    }

    /// The same spelling re-tagged with a new denotation and recolored for
    /// the new channel.
    pub fn retagged(&self, denotation: Denotation) -> Symbol {
        let colored_name = match denotation {
            Denotation::Semantic(_) => semantic_color(&self.colored_name),
            _ => phonetic_color(&self.colored_name),
        };
        Symbol {
            name: self.name.clone(),
            denotation,
            colored_name,
        }
    }

    /// Concatenate two symbols. The new name is both rendered spellings in
    /// order; the colored names are concatenated as-is.
    pub fn concat(&self, other: &Symbol, denotation: Denotation) -> Symbol {
        Symbol {
            name: format!("{self}{other}"),
            denotation,
            colored_name: format!("{}{}", self.colored_name, other.colored_name),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.name, self.denotation)
    }
}

// ---------------------------------------------------------------------------
// Morpheme
// ---------------------------------------------------------------------------

/// Index of a morpheme in the lexicon. Stable for the lexicon's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MorphemeId(pub usize);

/// A pronunciation paired with a concept, optionally spelled.
#[derive(Debug, Clone)]
pub struct Morpheme {
    phonology: String,
    alternatives: Vec<String>,
    concept: Concept,
    symbol: Option<Symbol>,
    is_primary: bool,
}

impl Morpheme {
    pub fn new(
        phonology: impl Into<String>,
        concept: Concept,
        symbol: Option<Symbol>,
        is_primary: bool,
    ) -> Self {
        Self {
            phonology: phonology.into(),
            alternatives: Vec::new(),
            concept,
            symbol,
            is_primary,
        }
    }

    pub fn phonology(&self) -> &str {
        &self.phonology
    }

    /// Alternative pronunciations added by ablaut.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn concept(&self) -> &Concept {
        &self.concept
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_spelled(&self) -> bool {
        self.symbol.is_some()
    }

    /// Colored spelling for snapshots, or `<NO_SYMBOL>`.
    pub fn symbol_name(&self) -> &str {
        match &self.symbol {
            Some(symbol) => symbol.colored_name(),
            None => "<NO_SYMBOL>",
        }
    }

    /// Add an alternative pronunciation. Returns false if it was already
    /// present or is the main pronunciation.
    pub fn add_alternative(&mut self, phonology: &str) -> bool {
        if phonology == self.phonology || self.alternatives.iter().any(|a| a == phonology) {
            return false;
        }
        self.alternatives.push(phonology.to_string());
        true
    }

    pub(crate) fn set_symbol(&mut self, symbol: Symbol) {
        self.symbol = Some(symbol);
    }
}

impl fmt::Display for Morpheme {
    /// `{pron(alts):CONCEPT:<spelling:glyphs:TYPE>:primary}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.phonology)?;
        if !self.alternatives.is_empty() {
            write!(f, "({})", self.alternatives.join(","))?;
        }
        write!(f, ":{}:", self.concept)?;
        if let Some(symbol) = &self.symbol {
            write!(f, "<{}:{}:{}>", symbol, symbol.glyphs(), symbol.symbol_type())?;
        }
        write!(f, ":{}}}", u8::from(self.is_primary))
    }
}
