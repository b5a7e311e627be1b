// Grammar engine errors.
//
// All of these indicate misconfiguration (a missing archive, a misspelled
// rule name) rather than transient failure, so callers abort the run
// instead of retrying.

use thiserror::Error;

/// Errors raised while loading a grammar archive or resolving a rule in it.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The archive file could not be read.
    #[error("failed loading grammar archive from {path}: {source}")]
    ArchiveNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The archive was read but is not valid grammar JSON.
    #[error("malformed grammar archive {archive}: {source}")]
    MalformedArchive {
        archive: String,
        #[source]
        source: serde_json::Error,
    },

    /// A named template, distance rule or ablaut rule is absent.
    #[error("no rule \"{rule}\" in {archive}")]
    RuleNotFound { rule: String, archive: String },

    /// A template slot names a phoneme class with no members.
    #[error("template \"{template}\" in {archive} uses unknown phoneme class \"{class}\"")]
    UnknownClass {
        template: String,
        class: String,
        archive: String,
    },
}

impl GrammarError {
    pub fn rule_not_found(rule: impl Into<String>, archive: impl Into<String>) -> Self {
        Self::RuleNotFound {
            rule: rule.into(),
            archive: archive.into(),
        }
    }
}
