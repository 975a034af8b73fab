//! Static site build command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use stopcite_static::{
    BuildConfig, FontSpec, FontTable, SiteBuilder, DEFAULT_FONT, DEFAULT_LANG, SITE_URL,
};

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    site: SiteSettings,
    #[serde(default)]
    paths: PathSettings,
    #[serde(default)]
    build: BuildSettings,
    /// Replaces the built-in font table when non-empty
    #[serde(default)]
    fonts: BTreeMap<String, FontSpec>,
}

#[derive(Debug, Deserialize)]
struct SiteSettings {
    #[serde(default = "default_url")]
    url: String,
    #[serde(default = "default_lang")]
    default_lang: String,
}

#[derive(Debug, Deserialize)]
struct PathSettings {
    #[serde(default = "default_output")]
    output: PathBuf,
    #[serde(default = "default_translations")]
    translations: PathBuf,
    #[serde(default = "default_templates")]
    templates: PathBuf,
    #[serde(default = "default_stylesheet")]
    stylesheet: PathBuf,
    #[serde(default = "default_script")]
    script: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BuildSettings {
    #[serde(default = "default_font")]
    default_font: String,
    static_assets: Option<Vec<String>>,
}

fn default_url() -> String {
    SITE_URL.to_string()
}
fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}
fn default_output() -> PathBuf {
    PathBuf::from("public")
}
fn default_translations() -> PathBuf {
    PathBuf::from("translations")
}
fn default_templates() -> PathBuf {
    PathBuf::from("templates")
}
fn default_stylesheet() -> PathBuf {
    PathBuf::from("pico.min.css")
}
fn default_script() -> PathBuf {
    PathBuf::from("lang.js")
}
fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            default_lang: default_lang(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            translations: default_translations(),
            templates: default_templates(),
            stylesheet: default_stylesheet(),
            script: default_script(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            default_font: default_font(),
            static_assets: None,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Merge the config file and command-line overrides into a build config.
fn build_config(root: PathBuf, file: ConfigFile, output: Option<PathBuf>) -> BuildConfig {
    let defaults = BuildConfig::default();

    let fonts = if file.fonts.is_empty() {
        FontTable::default()
    } else {
        FontTable::new(file.fonts)
    };

    BuildConfig {
        root,
        output_dir: output.unwrap_or(file.paths.output),
        translations_dir: file.paths.translations,
        templates_dir: file.paths.templates,
        stylesheet: file.paths.stylesheet,
        script: file.paths.script,
        site_url: file.site.url,
        default_lang: file.site.default_lang,
        default_font: file.build.default_font,
        fonts,
        static_assets: file.build.static_assets.unwrap_or(defaults.static_assets),
        ..defaults
    }
}

/// An explicit `--output` is relative to where the command was run, not to
/// the site root.
fn resolve_output(cwd: &Path, output: Option<PathBuf>) -> Option<PathBuf> {
    output.map(|dir| cwd.join(dir))
}

/// Run the build command.
pub fn run(root: PathBuf, config_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building static site...");

    let file_config = load_config(&root.join(config_path))?;

    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let output = resolve_output(&cwd, output);

    let config = build_config(root, file_config, output);
    let result = SiteBuilder::new(config).build()?;

    tracing::info!(
        "Built {} pages and copied {} assets in {}ms",
        result.pages(),
        result.assets.len(),
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
