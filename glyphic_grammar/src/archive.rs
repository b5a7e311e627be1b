// Grammar archive: the JSON file a `NativeGrammar` is built from.
//
// An archive bundles every named rule the simulation may ask for:
// - `phonemes`: the segment inventory, each segment tagged with a class.
//   Classes whose name starts with `V` are vowels.
// - `templates`: base-morph shapes as sequences of class slots. A slot
//   ending in `?` is optional (present with probability 1/2).
// - `distance_rules`: weighted edit-distance parameters.
// - `ablaut_rules`: ordered vowel rewrites.
//
// Loading validates that every template slot names a known class, so a bad
// template fails at startup rather than mid-run.

use crate::error::GrammarError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Label used in error messages for the compiled-in archive.
pub const EMBEDDED_LABEL: &str = "<embedded grammar>";

/// One segment of the phoneme inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonemeDef {
    pub symbol: char,
    pub class: String,
}

/// Directional substitution override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairCost {
    pub from: char,
    pub to: char,
    pub cost: f64,
}

/// Weighted edit-distance parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRule {
    pub insertion: f64,
    pub deletion: f64,
    /// Substitution between phonemes of different classes.
    pub substitution: f64,
    /// Substitution between phonemes of the same class.
    pub same_class_substitution: f64,
    /// Overrides checked before the class-based costs.
    #[serde(default)]
    pub pairs: Vec<PairCost>,
}

/// A single vowel rewrite inside an ablaut rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VowelRewrite {
    pub from: char,
    pub to: char,
}

/// A parsed grammar archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarArchive {
    pub phonemes: Vec<PhonemeDef>,
    pub templates: BTreeMap<String, Vec<String>>,
    pub distance_rules: BTreeMap<String, DistanceRule>,
    #[serde(default)]
    pub ablaut_rules: BTreeMap<String, Vec<VowelRewrite>>,
    /// Where the archive came from, for error messages.
    #[serde(skip)]
    pub label: String,
}

impl GrammarArchive {
    /// Parse and validate an archive from a JSON string.
    pub fn from_json(json: &str, label: &str) -> Result<Self, GrammarError> {
        let mut archive: GrammarArchive =
            serde_json::from_str(json).map_err(|source| GrammarError::MalformedArchive {
                archive: label.to_string(),
                source,
            })?;
        archive.label = label.to_string();
        archive.validate()?;
        Ok(archive)
    }

    /// Read, parse and validate an archive file.
    pub fn load(path: &Path) -> Result<Self, GrammarError> {
        let label = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| {
            GrammarError::ArchiveNotFound {
                path: label.clone(),
                source,
            }
        })?;
        Self::from_json(&json, &label)
    }

    /// The archive compiled into the binary.
    ///
    /// Panics if the embedded JSON is malformed (covered by tests).
    pub fn embedded() -> Self {
        let json = include_str!("../../data/grammar.json");
        Self::from_json(json, EMBEDDED_LABEL).expect("embedded grammar.json is malformed")
    }

    /// Phonemes of a class, in inventory order.
    pub fn class_members(&self, class: &str) -> Vec<char> {
        self.phonemes
            .iter()
            .filter(|p| p.class == class)
            .map(|p| p.symbol)
            .collect()
    }

    /// The class of a phoneme, if it is in the inventory.
    pub fn class_of(&self, phoneme: char) -> Option<&str> {
        self.phonemes
            .iter()
            .find(|p| p.symbol == phoneme)
            .map(|p| p.class.as_str())
    }

    pub fn template(&self, name: &str) -> Result<&[String], GrammarError> {
        self.templates
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| GrammarError::rule_not_found(name, &self.label))
    }

    pub fn distance_rule(&self, name: &str) -> Result<&DistanceRule, GrammarError> {
        self.distance_rules
            .get(name)
            .ok_or_else(|| GrammarError::rule_not_found(name, &self.label))
    }

    pub fn ablaut_rule(&self, name: &str) -> Result<&[VowelRewrite], GrammarError> {
        self.ablaut_rules
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| GrammarError::rule_not_found(name, &self.label))
    }

    fn validate(&self) -> Result<(), GrammarError> {
        for (name, slots) in &self.templates {
            for slot in slots {
                let class = slot.trim_end_matches('?');
                if self.class_members(class).is_empty() {
                    return Err(GrammarError::UnknownClass {
                        template: name.clone(),
                        class: class.to_string(),
                        archive: self.label.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Whether a phoneme class names vowels.
pub fn is_vowel_class(class: &str) -> bool {
    class.starts_with('V')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "phonemes": [
            {"symbol": "p", "class": "C"},
            {"symbol": "a", "class": "V"}
        ],
        "templates": {"CV": ["C", "V"]},
        "distance_rules": {
            "EDIT_DISTANCE": {
                "insertion": 1.0,
                "deletion": 1.0,
                "substitution": 2.0,
                "same_class_substitution": 0.5
            }
        }
    }"#;

    #[test]
    fn parses_small_archive() {
        let archive = GrammarArchive::from_json(SMALL, "small").unwrap();
        assert_eq!(archive.class_members("C"), vec!['p']);
        assert_eq!(archive.class_of('a'), Some("V"));
        assert!(archive.ablaut_rules.is_empty());
        assert_eq!(archive.template("CV").unwrap().len(), 2);
    }

    #[test]
    fn missing_rule_is_reported_with_archive_label() {
        let archive = GrammarArchive::from_json(SMALL, "small").unwrap();
        let err = archive.distance_rule("SOUNDEX").unwrap_err();
        assert_eq!(err.to_string(), "no rule \"SOUNDEX\" in small");
        assert!(archive.ablaut_rule("ABLAUT").is_err());
    }

    #[test]
    fn unknown_template_class_fails_validation() {
        let json = SMALL.replace(r#"["C", "V"]"#, r#"["C", "N?"]"#);
        let err = GrammarArchive::from_json(&json, "bad").unwrap_err();
        assert!(matches!(err, GrammarError::UnknownClass { ref class, .. } if class == "N"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = GrammarArchive::from_json("{\"phonemes\": 3}", "junk").unwrap_err();
        assert!(matches!(err, GrammarError::MalformedArchive { .. }));
    }

    #[test]
    fn missing_file_is_archive_not_found() {
        let err = GrammarArchive::load(Path::new("/nonexistent/grammar.json")).unwrap_err();
        assert!(matches!(err, GrammarError::ArchiveNotFound { .. }));
    }

    #[test]
    fn embedded_archive_loads_with_default_rules() {
        let archive = GrammarArchive::embedded();
        assert!(archive.template(crate::DEFAULT_TEMPLATE).is_ok());
        assert!(archive.distance_rule(crate::DEFAULT_DISTANCE_RULE).is_ok());
        assert!(archive.ablaut_rule(crate::DEFAULT_ABLAUT_RULE).is_ok());
        assert!(archive.phonemes.iter().any(|p| is_vowel_class(&p.class)));
    }
}
