//! Loading every translation file from a directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::translation::{parse_translation, LanguageEntry, LocaleError, Translation};

/// All translations of the site, in filename order.
#[derive(Debug, Clone, Default)]
pub struct TranslationSet {
    /// Parsed records
    pub records: Vec<Translation>,

    /// Language index, one entry per record in the same order
    pub languages: Vec<LanguageEntry>,
}

impl TranslationSet {
    /// Number of loaded translations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no translation was found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Language codes in load order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|t| t.lang.as_str())
    }
}

/// Load all `*.json` files directly inside `dir`.
///
/// Files are visited in lexicographic filename order so the language index is
/// stable across builds. Any unreadable or invalid file aborts the load, as
/// does a language code used by two files.
pub fn load_translations(dir: &Path) -> Result<TranslationSet, LocaleError> {
    if !dir.is_dir() {
        return Err(LocaleError::DirectoryNotFound(dir.display().to_string()));
    }

    let mut set = TranslationSet::default();
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| LocaleError::Read {
            path: e
                .path()
                .unwrap_or(dir)
                .display()
                .to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let content = fs::read_to_string(path).map_err(|e| LocaleError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let translation = parse_translation(&content, path)?;

        if let Some(first) = seen.get(&translation.lang) {
            return Err(LocaleError::DuplicateLanguage {
                lang: translation.lang,
                first: first.display().to_string(),
                second: path.display().to_string(),
            });
        }
        seen.insert(translation.lang.clone(), path.to_path_buf());

        tracing::debug!("Loaded {} from {}", translation.lang, path.display());

        set.languages.push(translation.language_entry());
        set.records.push(translation);
    }

    Ok(set)
}
