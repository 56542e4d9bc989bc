//! Merge rules loaded from YAML.
//!
//! ```yaml
//! artist_map:
//!   "Old Name": "New Name"
//!   "Duo": ["First", "Second"]
//! artists_with_comma:
//!   - "Big, Band"
//! name_map:
//!   complex:
//!     - artist: ["First", "Second"]
//!       alias: ["Song (Remastered)", "Song - 2011"]
//!       title: "Song"
//!   simple:
//!     "Old Title": "New Title"
//! ```

use std::fs;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::error::{CatalogError, Result};

/// A YAML field that may hold one string or a list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

// ============================================================================
// Artist Renames
// ============================================================================

/// Artist rename table. A name is either replaced by one name or expanded into
/// several (e.g. a duo credited under one name).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "FxHashMap<String, OneOrMany>")]
pub struct ArtistRenames {
    pub direct: FxHashMap<String, String>,
    pub expand: FxHashMap<String, Vec<String>>,
}

impl From<FxHashMap<String, OneOrMany>> for ArtistRenames {
    fn from(raw: FxHashMap<String, OneOrMany>) -> Self {
        let mut renames = ArtistRenames::default();
        for (name, target) in raw {
            match target {
                OneOrMany::One(to) => {
                    renames.direct.insert(name, to);
                }
                OneOrMany::Many(to) => {
                    renames.expand.insert(name, to);
                }
            }
        }
        renames
    }
}

impl ArtistRenames {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.expand.is_empty()
    }

    /// Append the replacement(s) for `name` to `out`. Unknown names pass through.
    pub fn resolve_into(&self, name: &str, out: &mut Vec<String>) {
        if let Some(names) = self.expand.get(name) {
            out.extend(names.iter().cloned());
        } else if let Some(to) = self.direct.get(name) {
            out.push(to.clone());
        } else {
            out.push(name.to_string());
        }
    }

    /// Apply the table to every name, flattening expansions.
    pub fn apply<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut out = Vec::new();
        for name in names {
            self.resolve_into(name, &mut out);
        }
        out
    }
}

// ============================================================================
// Title Aliases
// ============================================================================

/// Retitle a track when its artist set matches and its current title is one
/// of the aliases.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawComplexAlias")]
pub struct ComplexAlias {
    pub artists: FxHashSet<String>,
    pub aliases: Vec<String>,
    pub title: String,
}

#[derive(Deserialize)]
struct RawComplexAlias {
    artist: OneOrMany,
    alias: OneOrMany,
    title: String,
}

impl From<RawComplexAlias> for ComplexAlias {
    fn from(raw: RawComplexAlias) -> Self {
        Self {
            artists: raw.artist.into_vec().into_iter().collect(),
            aliases: raw.alias.into_vec(),
            title: raw.title,
        }
    }
}

impl ComplexAlias {
    pub fn new(artists: &[&str], aliases: &[&str], title: &str) -> Self {
        Self {
            artists: artists.iter().map(|a| a.to_string()).collect(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            title: title.to_string(),
        }
    }

    pub fn matches(&self, artists: &[&str], title: &str) -> bool {
        let credited: FxHashSet<&str> = artists.iter().copied().collect();
        credited.len() == self.artists.len()
            && self.artists.iter().all(|a| credited.contains(a.as_str()))
            && self.aliases.iter().any(|alias| alias == title)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NameAliases {
    /// Checked in order, first match wins.
    pub complex: Vec<ComplexAlias>,
    /// Plain title substitution, applied after the complex rules.
    pub simple: FxHashMap<String, String>,
}

impl NameAliases {
    pub fn is_empty(&self) -> bool {
        self.complex.is_empty() && self.simple.is_empty()
    }

    /// Resolve the final title of a track credited to `artists`.
    pub fn resolve(&self, artists: &[&str], title: &str) -> String {
        let title = self
            .complex
            .iter()
            .find(|rule| rule.matches(artists, title))
            .map_or(title, |rule| rule.title.as_str());
        self.simple.get(title).cloned().unwrap_or_else(|| title.to_string())
    }
}

// ============================================================================
// Merge Config
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    #[serde(rename = "artist_map")]
    pub artist_renames: ArtistRenames,
    /// Artist names that legitimately contain a comma.
    pub artists_with_comma: Vec<String>,
    #[serde(rename = "name_map")]
    pub aliases: NameAliases,
}

impl MergeConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
artist_map:
  "Jay": "JAY"
  "Duo": ["First", "Second"]
artists_with_comma:
  - "Big, Band"
name_map:
  complex:
    - artist: ["First", "Second"]
      alias: ["Song (Remastered)", "Song - 2011"]
      title: "Song"
    - artist: "Solo"
      alias: "Intro"
      title: "Overture"
  simple:
    "Colour": "Color"
"#;

    #[test]
    fn test_parse_sample() {
        let config = MergeConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.artist_renames.direct.get("Jay"), Some(&"JAY".to_string()));
        assert_eq!(
            config.artist_renames.expand.get("Duo"),
            Some(&vec!["First".to_string(), "Second".to_string()])
        );
        assert_eq!(config.artists_with_comma, vec!["Big, Band"]);
        assert_eq!(config.aliases.complex.len(), 2);
        assert_eq!(config.aliases.simple.get("Colour"), Some(&"Color".to_string()));
    }

    #[test]
    fn test_empty_config() {
        let config = MergeConfig::from_yaml_str("").unwrap();
        assert!(config.artist_renames.is_empty());
        assert!(config.aliases.is_empty());

        let config = MergeConfig::from_yaml_str("artists_with_comma: []").unwrap();
        assert!(config.artists_with_comma.is_empty());
    }

    #[test]
    fn test_renames_apply() {
        let config = MergeConfig::from_yaml_str(SAMPLE).unwrap();
        let names = config.artist_renames.apply(["Jay", "Duo", "Other"]);
        assert_eq!(names, vec!["JAY", "First", "Second", "Other"]);
    }

    #[test]
    fn test_complex_alias_is_order_insensitive() {
        let config = MergeConfig::from_yaml_str(SAMPLE).unwrap();
        let aliases = &config.aliases;
        assert_eq!(aliases.resolve(&["Second", "First"], "Song - 2011"), "Song");
        assert_eq!(aliases.resolve(&["First"], "Song - 2011"), "Song - 2011");
        assert_eq!(aliases.resolve(&["Solo"], "Intro"), "Overture");
    }

    #[test]
    fn test_simple_alias_after_complex() {
        let mut aliases = NameAliases::default();
        aliases.complex.push(ComplexAlias::new(&["A"], &["Grey"], "Colour"));
        aliases.simple.insert("Colour".into(), "Color".into());
        assert_eq!(aliases.resolve(&["A"], "Grey"), "Color");
        assert_eq!(aliases.resolve(&["B"], "Colour"), "Color");
    }

    #[test]
    fn test_load_missing_file() {
        let err = MergeConfig::load(Path::new("/nonexistent/rules.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound(_)));
    }
}
