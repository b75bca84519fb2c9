//! Grammar metadata from `tree-sitter.json`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

const TREE_SITTER_JSON: &str = include_str!("../../tree-sitter.json");

/// The contents of `tree-sitter.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct GrammarConfig {
    pub grammars: Vec<GrammarEntry>,
    pub metadata: Metadata,
    #[serde(default)]
    pub bindings: BTreeMap<String, bool>,
}

/// One grammar declared by the package.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrammarEntry {
    pub name: String,
    pub camelcase: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub highlights: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub license: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

impl GrammarConfig {
    /// Decodes the `tree-sitter.json` bundled with this crate.
    pub fn load() -> Result<Self> {
        Self::from_json(TREE_SITTER_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The entry for the `sifu` grammar, if declared.
    pub fn grammar(&self) -> Option<&GrammarEntry> {
        self.grammars.iter().find(|grammar| grammar.name == crate::LANGUAGE.name())
    }
}

impl GrammarEntry {
    /// Whether `path` has one of this grammar's file types as its extension.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file_types.iter().any(|file_type| file_type == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SifuError;

    #[test]
    fn bundled_config_describes_sifu() {
        let config = GrammarConfig::load().unwrap();
        let grammar = config.grammar().unwrap();
        assert_eq!(grammar.scope, "source.sifu");
        assert_eq!(grammar.highlights.as_deref(), Some("queries/highlights.scm"));
        assert_eq!(config.metadata.license.as_deref(), Some("Apache-2.0"));
        assert_eq!(config.bindings.get("rust"), Some(&true));
        assert_eq!(config.bindings.get("swift"), Some(&false));
    }

    #[test]
    fn matches_by_extension() {
        let config = GrammarConfig::load().unwrap();
        let grammar = config.grammar().unwrap();
        assert!(grammar.matches_path(Path::new("lib/core.sifu")));
        assert!(!grammar.matches_path(Path::new("core.sifu.bak")));
        assert!(!grammar.matches_path(Path::new("Makefile")));
    }

    #[test]
    fn malformed_config_is_reported() {
        let err = GrammarConfig::from_json("{\"grammars\": 3}").unwrap_err();
        assert!(matches!(err, SifuError::Config(_)));
        assert!(err.to_string().starts_with("invalid grammar configuration"));
    }
}
