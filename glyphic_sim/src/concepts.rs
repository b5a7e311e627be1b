// The base concept inventory: each basic concept and the glyph that writes
// it.
//
// Loaded from JSON (`{"concepts": [{"name": "SUN", "glyph": "☉"}, ...]}`) via
// `ConceptInventory::from_json()`, or from the copy of `data/concepts.json`
// embedded at compile time. Entry order is file order, and the lexicon
// builder walks concepts in that order, so it is part of what a seed
// reproduces.

use crate::error::SimError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConceptGlyph {
    pub name: String,
    pub glyph: String,
}

#[derive(Debug, Deserialize)]
struct ConceptFile {
    concepts: Vec<ConceptGlyph>,
}

#[derive(Debug, Clone)]
pub struct ConceptInventory {
    entries: Vec<ConceptGlyph>,
}

impl ConceptInventory {
    /// Parse an inventory from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: ConceptFile = serde_json::from_str(json)?;
        Ok(Self {
            entries: file.concepts,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_json(&json).map_err(|e| SimError::json(path, e))
    }

    /// The inventory embedded at compile time. Panics if the embedded JSON
    /// is malformed.
    pub fn embedded() -> Self {
        let json = include_str!("../../data/concepts.json");
        Self::from_json(json).expect("embedded concepts.json should be valid")
    }

    /// All entries, in file order.
    pub fn all(&self) -> &[ConceptGlyph] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn embedded_inventory_loads() {
        let inventory = ConceptInventory::embedded();
        assert!(inventory.len() >= 50);
        let glyph = |name: &str| {
            inventory
                .all()
                .iter()
                .find(|e| e.name == name)
                .map(|e| e.glyph.as_str())
        };
        assert_eq!(glyph("SUN"), Some("☉"));
        assert_eq!(glyph("KING"), Some("♔"));
        assert!(glyph("NOTHING").is_none());
    }

    #[test]
    fn embedded_names_and_glyphs_are_unique() {
        let inventory = ConceptInventory::embedded();
        let names: BTreeSet<&str> = inventory.names().into_iter().collect();
        assert_eq!(names.len(), inventory.len());
        let glyphs: BTreeSet<&str> = inventory.all().iter().map(|e| e.glyph.as_str()).collect();
        assert_eq!(glyphs.len(), inventory.len());
        // Names are plain tags: no separators, nothing that counts as a glyph.
        assert!(names.iter().all(|n| n.is_ascii() && !n.contains(',')));
        // Glyphs are non-ASCII so the glyph counter sees them.
        assert!(
            inventory
                .all()
                .iter()
                .all(|e| e.glyph.chars().all(|c| !c.is_ascii()))
        );
    }

    #[test]
    fn from_json_preserves_order() {
        let inventory = ConceptInventory::from_json(
            r#"{"concepts": [{"name": "MOON", "glyph": "☽"}, {"name": "SUN", "glyph": "☉"}]}"#,
        )
        .unwrap();
        assert_eq!(inventory.names(), vec!["MOON", "SUN"]);
    }

    #[test]
    fn malformed_json_fails() {
        assert!(ConceptInventory::from_json(r#"{"concepts": [{"name": "SUN"}]}"#).is_err());
    }
}
