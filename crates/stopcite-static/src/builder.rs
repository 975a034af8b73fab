//! Site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use stopcite_locale::{load_translations, LocaleError, TranslationSet};

use crate::assets::{copy_static_assets, AssetError, InlineAssets, STATIC_ASSETS};
use crate::fonts::{FontError, FontLoader, FontTable, DEFAULT_FONT};
use crate::output::{absolute_path, write_page, OutputError, StagingDir};
use crate::sitemap::{page_url, sitemap_entries};
use crate::templates::{
    PageContext, RenderError, SitemapContext, TemplateEngine, PAGE_TEMPLATE, SITEMAP_TEMPLATE,
};

/// Base URL of the published site.
pub const SITE_URL: &str = "https://stopcitingai.com";

/// Language served at the site root.
pub const DEFAULT_LANG: &str = "en";

/// Configuration for building the site.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site root holding translations, templates and assets
    pub root: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Directory of per-language JSON files
    pub translations_dir: PathBuf,

    /// Directory of templates
    pub templates_dir: PathBuf,

    /// Page template name
    pub page_template: String,

    /// Sitemap template name
    pub sitemap_template: String,

    /// Stylesheet inlined into every page
    pub stylesheet: PathBuf,

    /// Script inlined into every page
    pub script: PathBuf,

    /// Base URL for the sitemap and canonical links
    pub site_url: String,

    /// Language written to the output root
    pub default_lang: String,

    /// Font used by translations without a `font` field
    pub default_font: String,

    /// Available fonts
    pub fonts: FontTable,

    /// Files copied verbatim to the output root when present
    pub static_assets: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("public"),
            translations_dir: PathBuf::from("translations"),
            templates_dir: PathBuf::from("templates"),
            page_template: PAGE_TEMPLATE.to_string(),
            sitemap_template: SITEMAP_TEMPLATE.to_string(),
            stylesheet: PathBuf::from("pico.min.css"),
            script: PathBuf::from("lang.js"),
            site_url: SITE_URL.to_string(),
            default_lang: DEFAULT_LANG.to_string(),
            default_font: DEFAULT_FONT.to_string(),
            fonts: FontTable::default(),
            static_assets: STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BuildConfig {
    /// Resolve a configured path against the site root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Languages built, in translation file order
    pub languages: Vec<String>,

    /// Static assets copied
    pub assets: Vec<String>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

impl BuildResult {
    /// Number of pages generated.
    pub fn pages(&self) -> usize {
        self.languages.len()
    }
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Locale(#[from] LocaleError),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to render page for `{lang}`: {source}")]
    Page {
        lang: String,
        #[source]
        source: RenderError,
    },

    #[error("Failed to render sitemap: {0}")]
    Sitemap(RenderError),

    #[error("No translations found in {0}")]
    NoTranslations(String),

    #[error("Refusing to build into {output}: publishing would delete {protected}")]
    UnsafeOutput { output: String, protected: String },
}

/// Builds the site from a [`BuildConfig`].
pub struct SiteBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: BuildConfig) -> Self {
        let templates = TemplateEngine::new(config.resolve(&config.templates_dir));
        Self { config, templates }
    }

    /// Build the site.
    ///
    /// Everything is written to a staging directory first; the output
    /// directory is only replaced once the whole build succeeded.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let config = &self.config;

        self.check_output_dir()?;

        // Load and check all inputs before writing anything
        let translations_dir = config.resolve(&config.translations_dir);
        let translations = load_translations(&translations_dir)?;
        if translations.is_empty() {
            return Err(BuildError::NoTranslations(
                translations_dir.display().to_string(),
            ));
        }
        if !translations.codes().any(|code| code == config.default_lang) {
            tracing::warn!(
                "No translation for default language `{}`; {} will have no index.html",
                config.default_lang,
                config.output_dir.display()
            );
        }

        config.fonts.validate(&translations.records, &config.default_font)?;

        let assets = InlineAssets::load(
            &config.resolve(&config.stylesheet),
            &config.resolve(&config.script),
        )?;

        let output_dir = config.resolve(&config.output_dir);
        let staging = StagingDir::create(&output_dir)?;

        let languages = self.build_pages(&translations, &assets, staging.path())?;
        self.generate_sitemap(&languages, staging.path())?;
        let copied = copy_static_assets(&config.root, staging.path(), &config.static_assets)?;

        let output_dir = staging.publish()?;

        Ok(BuildResult {
            languages,
            assets: copied,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir,
        })
    }

    /// Refuse an output directory that is, or contains, one of the build's
    /// inputs. Publishing removes the output directory before swapping in the
    /// new build.
    fn check_output_dir(&self) -> Result<(), BuildError> {
        let config = &self.config;
        let resolve = |path: &Path| {
            absolute_path(path).map_err(|e| OutputError::Publish {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };

        let output = resolve(&config.resolve(&config.output_dir))?;

        let mut inputs = vec![
            config.root.clone(),
            config.resolve(&config.translations_dir),
            config.resolve(&config.templates_dir),
            config.resolve(&config.stylesheet),
            config.resolve(&config.script),
        ];
        inputs.extend(config.fonts.files().map(|file| config.resolve(file)));

        for input in inputs {
            if resolve(&input)?.starts_with(&output) {
                return Err(BuildError::UnsafeOutput {
                    output: output.display().to_string(),
                    protected: input.display().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Render and write one page per translation.
    fn build_pages(
        &self,
        translations: &TranslationSet,
        assets: &InlineAssets,
        out: &Path,
    ) -> Result<Vec<String>, BuildError> {
        let config = &self.config;
        let mut fonts = FontLoader::new(&config.root, &config.fonts);
        let mut built = Vec::with_capacity(translations.len());

        for translation in &translations.records {
            let lang = translation.lang.as_str();
            tracing::info!("Building {}...", lang);

            let font = fonts.resolve(translation.font_or(&config.default_font))?;
            let url = page_url(&config.site_url, lang, &config.default_lang);

            let context = PageContext {
                font_data: &font.data,
                font_family: &font.family,
                font_weight: font.weight,
                pico_css: &assets.stylesheet,
                lang_js: &assets.script,
                languages: &translations.languages,
                site_url: config.site_url.trim_end_matches('/'),
                page_url: &url,
            };

            let html = self
                .templates
                .render_page(&config.page_template, translation, &context)
                .map_err(|source| BuildError::Page {
                    lang: lang.to_string(),
                    source,
                })?;

            let path = write_page(out, lang, &config.default_lang, &html)?;
            tracing::info!(
                "  -> {}",
                config
                    .output_dir
                    .join(path.strip_prefix(out).unwrap_or(&path))
                    .display()
            );

            built.push(lang.to_string());
        }

        tracing::debug!("Inlined {} distinct fonts", fonts.loaded());

        Ok(built)
    }

    /// Render the sitemap for the built languages.
    fn generate_sitemap(&self, languages: &[String], out: &Path) -> Result<(), BuildError> {
        let config = &self.config;
        let entries = sitemap_entries(
            &config.site_url,
            languages.iter().map(String::as_str),
            &config.default_lang,
        );

        let context = SitemapContext {
            site_url: config.site_url.trim_end_matches('/'),
            default_lang: &config.default_lang,
            languages: entries.iter().map(|e| e.lang.as_str()).collect(),
            entries: &entries,
        };

        let sitemap = self
            .templates
            .render_sitemap(&config.sitemap_template, &context)
            .map_err(BuildError::Sitemap)?;

        let path = out.join("sitemap.xml");
        fs::write(&path, sitemap).map_err(|e| OutputError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Generated sitemap.xml");

        Ok(())
    }
}
