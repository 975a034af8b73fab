//! Font configuration and base64 inlining.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use stopcite_locale::Translation;

/// Font key used when a translation does not name one.
pub const DEFAULT_FONT: &str = "caveat";

/// A configured font.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FontSpec {
    /// Font file, relative to the site root
    pub file: PathBuf,
    /// CSS font family
    pub family: String,
    /// CSS font weight
    pub weight: u16,
}

/// Fonts available to translations, keyed by font key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    fonts: BTreeMap<String, FontSpec>,
}

impl FontTable {
    /// Create a table from explicit entries.
    pub fn new(fonts: BTreeMap<String, FontSpec>) -> Self {
        Self { fonts }
    }

    /// Look up a font key.
    pub fn get(&self, key: &str) -> Option<&FontSpec> {
        self.fonts.get(key)
    }

    /// Configured font keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Font files of every configured font.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.fonts.values().map(|spec| spec.file.as_path())
    }

    /// Check that every font key used by `records` is configured.
    ///
    /// Reports the first translation that names an unknown key.
    pub fn validate(&self, records: &[Translation], default_font: &str) -> Result<(), FontError> {
        for record in records {
            let key = record.font_or(default_font);
            if !self.fonts.contains_key(key) {
                return Err(FontError::UnknownKey {
                    key: key.to_string(),
                    lang: record.lang.clone(),
                    path: record.source.display().to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for FontTable {
    fn default() -> Self {
        let mut fonts = BTreeMap::new();
        fonts.insert(
            "caveat".to_string(),
            FontSpec {
                file: PathBuf::from("fonts/caveat-v23-cyrillic_cyrillic-ext_latin_latin-ext-700.woff2"),
                family: "Caveat".to_string(),
                weight: 700,
            },
        );
        fonts.insert(
            "klee-one".to_string(),
            FontSpec {
                file: PathBuf::from("fonts/klee-one-v13-japanese-600.woff2"),
                family: "Klee One".to_string(),
                weight: 600,
            },
        );
        Self { fonts }
    }
}

/// A font ready to be inlined into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    /// Base64 of the font file
    pub data: String,
    /// CSS font family
    pub family: String,
    /// CSS font weight
    pub weight: u16,
}

/// Errors that can occur while resolving fonts.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("Unknown font `{key}` referenced by `{lang}` ({path})")]
    UnknownKey {
        key: String,
        lang: String,
        path: String,
    },

    #[error("Font `{0}` is not configured")]
    NotConfigured(String),

    #[error("Failed to read font file {path}: {message}")]
    Read { path: String, message: String },
}

/// Read a font file and encode it as base64.
pub fn encode_font(path: &Path) -> Result<String, FontError> {
    let bytes = fs::read(path).map_err(|e| FontError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(STANDARD.encode(bytes))
}

/// Resolves font keys against a table, reading each file at most once.
#[derive(Debug)]
pub struct FontLoader<'a> {
    root: &'a Path,
    table: &'a FontTable,
    cache: BTreeMap<String, ResolvedFont>,
}

impl<'a> FontLoader<'a> {
    /// Create a loader resolving font files relative to `root`.
    pub fn new(root: &'a Path, table: &'a FontTable) -> Self {
        Self {
            root,
            table,
            cache: BTreeMap::new(),
        }
    }

    /// Resolve a font key to its inlined data.
    pub fn resolve(&mut self, key: &str) -> Result<&ResolvedFont, FontError> {
        let slot = match self.cache.entry(key.to_string()) {
            Entry::Occupied(cached) => return Ok(cached.into_mut()),
            Entry::Vacant(slot) => slot,
        };

        let spec = self
            .table
            .get(key)
            .ok_or_else(|| FontError::NotConfigured(key.to_string()))?;

        let data = encode_font(&self.root.join(&spec.file))?;
        tracing::debug!("Inlined font {} ({} bytes base64)", key, data.len());

        Ok(slot.insert(ResolvedFont {
            data,
            family: spec.family.clone(),
            weight: spec.weight,
        }))
    }

    /// Number of distinct fonts read so far.
    pub fn loaded(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn translation(lang: &str, font: Option<&str>) -> Translation {
        let source = match font {
            Some(font) => format!(r#"{{"lang": "{lang}", "language_name": "x", "font": "{font}"}}"#),
            None => format!(r#"{{"lang": "{lang}", "language_name": "x"}}"#),
        };
        stopcite_locale::parse_translation(&source, Path::new(&format!("{lang}.json"))).unwrap()
    }

    #[test]
    fn default_table_has_both_fonts() {
        let table = FontTable::default();

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["caveat", "klee-one"]);
        assert_eq!(table.get("caveat").unwrap().weight, 700);
        assert_eq!(table.get("klee-one").unwrap().family, "Klee One");
    }

    #[test]
    fn encodes_font_as_base64() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("font.woff2");
        fs::write(&path, b"wOF2\x00\x01").unwrap();

        assert_eq!(encode_font(&path).unwrap(), "d09GMgAB");
    }

    #[test]
    fn validate_accepts_default_and_explicit_keys() {
        let table = FontTable::default();
        let records = vec![translation("en", None), translation("ja", Some("klee-one"))];

        assert!(table.validate(&records, DEFAULT_FONT).is_ok());
    }

    #[test]
    fn validate_reports_unknown_key() {
        let table = FontTable::default();
        let records = vec![translation("en", None), translation("ko", Some("nanum"))];

        let err = table.validate(&records, DEFAULT_FONT).unwrap_err();

        assert!(matches!(err, FontError::UnknownKey { ref key, ref lang, .. } if key == "nanum" && lang == "ko"));
        assert!(err.to_string().contains("ko.json"));
    }

    #[test]
    fn validate_reports_unknown_default() {
        let table = FontTable::default();
        let records = vec![translation("en", None)];

        assert!(table.validate(&records, "comic-sans").is_err());
    }

    #[test]
    fn loader_reads_each_font_once() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("fonts")).unwrap();
        fs::write(temp.path().join("fonts/a.woff2"), b"abc").unwrap();

        let mut fonts = BTreeMap::new();
        fonts.insert(
            "a".to_string(),
            FontSpec {
                file: PathBuf::from("fonts/a.woff2"),
                family: "A".to_string(),
                weight: 400,
            },
        );
        let table = FontTable::new(fonts);
        let mut loader = FontLoader::new(temp.path(), &table);

        let first = loader.resolve("a").unwrap().clone();
        fs::remove_file(temp.path().join("fonts/a.woff2")).unwrap();
        let second = loader.resolve("a").unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first.data, "YWJj");
        assert_eq!(first.family, "A");
        assert_eq!(loader.loaded(), 1);
    }

    #[test]
    fn loader_reports_unconfigured_key_without_caching_it() {
        let temp = tempdir().unwrap();
        let table = FontTable::default();
        let mut loader = FontLoader::new(temp.path(), &table);

        let err = loader.resolve("nanum").unwrap_err();

        assert!(matches!(err, FontError::NotConfigured(ref key) if key == "nanum"));
        assert_eq!(loader.loaded(), 0);
    }

    #[test]
    fn lists_font_files() {
        let table = FontTable::default();

        assert_eq!(
            table.files().collect::<Vec<_>>(),
            vec![
                Path::new("fonts/caveat-v23-cyrillic_cyrillic-ext_latin_latin-ext-700.woff2"),
                Path::new("fonts/klee-one-v13-japanese-600.woff2"),
            ]
        );
    }

    #[test]
    fn loader_errors_on_missing_file() {
        let temp = tempdir().unwrap();
        let table = FontTable::default();
        let mut loader = FontLoader::new(temp.path(), &table);

        let err = loader.resolve("caveat").unwrap_err();

        assert!(matches!(err, FontError::Read { .. }));
    }
}
