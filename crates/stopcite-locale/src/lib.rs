//! Translation loading for the stopcite site builder.
//!
//! Reads per-language JSON files, substitutes the assistant-name placeholder
//! and derives the language index used by the language switcher.

pub mod loader;
pub mod translation;

pub use loader::{load_translations, TranslationSet};
pub use translation::{
    is_valid_lang_code, parse_translation, substitute_placeholders, LanguageEntry, LocaleError,
    Translation, AI_PLACEHOLDER, AI_SPAN,
};
