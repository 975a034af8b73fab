//! Translation records and placeholder substitution.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Token translators write wherever the assistant's name belongs.
pub const AI_PLACEHOLDER: &str = "{ai}";

/// Markup substituted for [`AI_PLACEHOLDER`].
pub const AI_SPAN: &str = r#"<span class="ai">ChatGPT</span>"#;

/// A parsed per-language translation file.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Language code, unique across the set
    pub lang: String,

    /// Display name shown in the language switcher
    pub language_name: String,

    /// Font key, if the file overrides the default font
    pub font: Option<String>,

    /// Every top-level field of the file, placeholders already substituted
    pub fields: Map<String, Value>,

    /// File the record was read from
    pub source: PathBuf,
}

impl Translation {
    /// Font key for this record, falling back to `default`.
    pub fn font_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.font.as_deref().unwrap_or(default)
    }

    /// The (code, name) pair used in the language index.
    pub fn language_entry(&self) -> LanguageEntry {
        LanguageEntry {
            code: self.lang.clone(),
            name: self.language_name.clone(),
        }
    }
}

/// One entry of the language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    /// Language code
    pub code: String,
    /// Display name
    pub name: String,
}

/// Errors that can occur while loading translations.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    #[error("Translations directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid JSON in {path}: {message}")]
    InvalidJson { path: String, message: String },

    #[error("{path}: translation must be a JSON object")]
    NotAnObject { path: String },

    #[error("{path}: missing required field `{field}`")]
    MissingField { path: String, field: &'static str },

    #[error("{path}: field `{field}` must be a string")]
    InvalidField { path: String, field: &'static str },

    #[error("{path}: `{lang}` is not a valid language code")]
    InvalidLangCode { path: String, lang: String },

    #[error("Duplicate language `{lang}` in {first} and {second}")]
    DuplicateLanguage {
        lang: String,
        first: String,
        second: String,
    },
}

/// Parse the text of one translation file.
///
/// `path` is only used for diagnostics and recorded as the record's source.
pub fn parse_translation(source: &str, path: &Path) -> Result<Translation, LocaleError> {
    let display = path.display().to_string();

    let mut value: Value =
        serde_json::from_str(source).map_err(|e| LocaleError::InvalidJson {
            path: display.clone(),
            message: e.to_string(),
        })?;

    substitute_placeholders(&mut value);

    let Value::Object(fields) = value else {
        return Err(LocaleError::NotAnObject { path: display });
    };

    let lang = required_str(&fields, "lang", &display)?;
    let language_name = required_str(&fields, "language_name", &display)?;

    let font = match fields.get("font") {
        None | Some(Value::Null) => None,
        Some(Value::String(font)) => Some(font.clone()),
        Some(_) => {
            return Err(LocaleError::InvalidField {
                path: display,
                field: "font",
            })
        }
    };

    if !is_valid_lang_code(&lang) {
        return Err(LocaleError::InvalidLangCode {
            path: display,
            lang,
        });
    }

    Ok(Translation {
        lang,
        language_name,
        font,
        fields,
        source: path.to_path_buf(),
    })
}

fn required_str(
    fields: &Map<String, Value>,
    field: &'static str,
    path: &str,
) -> Result<String, LocaleError> {
    match fields.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(LocaleError::InvalidField {
            path: path.to_string(),
            field,
        }),
        None => Err(LocaleError::MissingField {
            path: path.to_string(),
            field,
        }),
    }
}

/// Replace every [`AI_PLACEHOLDER`] in the string values of `value`.
///
/// Object keys are left alone. Applying this twice is a no-op the second time
/// because [`AI_SPAN`] holds no placeholder.
pub fn substitute_placeholders(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains(AI_PLACEHOLDER) {
                *s = s.replace(AI_PLACEHOLDER, AI_SPAN);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(substitute_placeholders),
        Value::Object(map) => map.values_mut().for_each(substitute_placeholders),
        _ => {}
    }
}

/// Whether `code` can be used as a language code and output directory name.
pub fn is_valid_lang_code(code: &str) -> bool {
    static LANG_CODE: OnceLock<Regex> = OnceLock::new();
    LANG_CODE
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$").expect("language code pattern")
        })
        .is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Translation, LocaleError> {
        parse_translation(source, Path::new("translations/xx.json"))
    }

    #[test]
    fn parses_required_and_extra_fields() {
        let t = parse(
            r#"{"lang": "fr", "language_name": "Français", "title": "Bonjour", "font": "klee-one"}"#,
        )
        .unwrap();

        assert_eq!(t.lang, "fr");
        assert_eq!(t.language_name, "Français");
        assert_eq!(t.font.as_deref(), Some("klee-one"));
        assert_eq!(t.fields["title"], Value::from("Bonjour"));
        assert_eq!(t.fields["lang"], Value::from("fr"));
        assert_eq!(t.source, PathBuf::from("translations/xx.json"));
    }

    #[test]
    fn font_defaults_when_absent() {
        let t = parse(r#"{"lang": "en", "language_name": "English"}"#).unwrap();

        assert_eq!(t.font, None);
        assert_eq!(t.font_or("caveat"), "caveat");
    }

    #[test]
    fn substitutes_ai_placeholder() {
        let t = parse(
            r#"{"lang": "en", "language_name": "English", "title": "Hello {ai}, bye {ai}"}"#,
        )
        .unwrap();

        assert_eq!(
            t.fields["title"],
            Value::from(r#"Hello <span class="ai">ChatGPT</span>, bye <span class="ai">ChatGPT</span>"#)
        );
    }

    #[test]
    fn substitutes_inside_nested_values() {
        let mut value = serde_json::json!({
            "items": ["{ai} says", {"note": "ask {ai}"}],
            "count": 3
        });

        substitute_placeholders(&mut value);

        assert_eq!(
            value,
            serde_json::json!({
                "items": [format!("{AI_SPAN} says"), {"note": format!("ask {AI_SPAN}")}],
                "count": 3
            })
        );
    }

    #[test]
    fn substitution_is_idempotent() {
        let mut once = Value::from("Stop citing {ai}");
        substitute_placeholders(&mut once);
        let mut twice = once.clone();
        substitute_placeholders(&mut twice);

        assert_eq!(once, twice);

        let mut plain = Value::from("Nothing to replace");
        substitute_placeholders(&mut plain);
        assert_eq!(plain, Value::from("Nothing to replace"));
    }

    #[test]
    fn placeholder_with_quotes_keeps_json_valid() {
        // The span carries quotes; substitution after parsing must not break them.
        let t = parse(r#"{"lang": "en", "language_name": "English", "q": "\"{ai}\""}"#).unwrap();

        assert_eq!(t.fields["q"], Value::from(format!("\"{AI_SPAN}\"")));
    }

    #[test]
    fn errors_on_malformed_json() {
        let err = parse(r#"{"lang": "en", "#).unwrap_err();

        assert!(matches!(err, LocaleError::InvalidJson { .. }));
        assert!(err.to_string().contains("translations/xx.json"));
    }

    #[test]
    fn errors_on_non_object() {
        let err = parse(r#"["en"]"#).unwrap_err();

        assert!(matches!(err, LocaleError::NotAnObject { .. }));
    }

    #[test]
    fn errors_on_missing_required_fields() {
        let err = parse(r#"{"language_name": "English"}"#).unwrap_err();
        assert!(matches!(err, LocaleError::MissingField { field: "lang", .. }));

        let err = parse(r#"{"lang": "en"}"#).unwrap_err();
        assert!(matches!(
            err,
            LocaleError::MissingField {
                field: "language_name",
                ..
            }
        ));
    }

    #[test]
    fn errors_on_mistyped_fields() {
        let err = parse(r#"{"lang": 7, "language_name": "English"}"#).unwrap_err();
        assert!(matches!(err, LocaleError::InvalidField { field: "lang", .. }));

        let err = parse(r#"{"lang": "en", "language_name": "English", "font": 1}"#).unwrap_err();
        assert!(matches!(err, LocaleError::InvalidField { field: "font", .. }));
    }

    #[test]
    fn rejects_unsafe_language_codes() {
        let err = parse(r#"{"lang": "../etc", "language_name": "Bad"}"#).unwrap_err();

        assert!(matches!(err, LocaleError::InvalidLangCode { .. }));
    }

    #[test]
    fn validates_language_codes() {
        assert!(is_valid_lang_code("en"));
        assert!(is_valid_lang_code("pt-BR"));
        assert!(is_valid_lang_code("zh-Hans"));
        assert!(is_valid_lang_code("fil"));

        assert!(!is_valid_lang_code(""));
        assert!(!is_valid_lang_code("e"));
        assert!(!is_valid_lang_code("en/fr"));
        assert!(!is_valid_lang_code("en-"));
        assert!(!is_valid_lang_code(".."));
    }
}
