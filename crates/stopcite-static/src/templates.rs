//! Template engine for rendering pages and the sitemap.
//!
//! Templates are read from the site's templates directory. Output is never
//! auto-escaped: translations are maintainer-written and carry intentional
//! markup such as the assistant-name span.

use std::path::PathBuf;

use minijinja::{path_loader, AutoEscape, Environment};
use serde::Serialize;
use serde_json::{Map, Value};

use stopcite_locale::{LanguageEntry, Translation};

use crate::sitemap::SitemapEntry;

/// Default name of the page template.
pub const PAGE_TEMPLATE: &str = "index.html.jinja";

/// Default name of the sitemap template.
pub const SITEMAP_TEMPLATE: &str = "sitemap.xml.jinja";

/// Values shared by every page, merged with the translation's own fields.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext<'a> {
    /// Base64 font data
    pub font_data: &'a str,
    /// CSS font family
    pub font_family: &'a str,
    /// CSS font weight
    pub font_weight: u16,
    /// Inlined stylesheet
    pub pico_css: &'a str,
    /// Inlined language switcher script
    pub lang_js: &'a str,
    /// Every language of the site
    pub languages: &'a [LanguageEntry],
    /// Base URL of the site
    pub site_url: &'a str,
    /// Canonical URL of this page
    pub page_url: &'a str,
}

/// Context for rendering the sitemap.
#[derive(Debug, Clone, Serialize)]
pub struct SitemapContext<'a> {
    /// Base URL of the site
    pub site_url: &'a str,
    /// Language served at the site root
    pub default_lang: &'a str,
    /// Built language codes, sorted
    pub languages: Vec<&'a str>,
    /// One entry per language
    pub entries: &'a [SitemapEntry],
}

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render {template}: {message}")]
    Template { template: String, message: String },

    #[error("`{lang}` defines `{field}`, which is reserved for the page template")]
    ReservedField { lang: String, field: String },
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine loading templates from `templates_dir`.
    ///
    /// A `sitemap.xml.jinja` in the directory replaces the built-in one.
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let mut env = Environment::new();

        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        let from_dir = path_loader(templates_dir.into());
        env.set_loader(move |name| match from_dir(name)? {
            Some(source) => Ok(Some(source)),
            None if name == SITEMAP_TEMPLATE => Ok(Some(BUILTIN_SITEMAP.to_string())),
            None => Ok(None),
        });

        Self { env }
    }

    /// Render one translation through the page template.
    pub fn render_page(
        &self,
        template: &str,
        translation: &Translation,
        context: &PageContext<'_>,
    ) -> Result<String, RenderError> {
        let shared = match serde_json::to_value(context) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                return Err(RenderError::Template {
                    template: template.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let mut merged = translation.fields.clone();
        for (key, value) in shared {
            if merged.contains_key(&key) {
                return Err(RenderError::ReservedField {
                    lang: translation.lang.clone(),
                    field: key,
                });
            }
            merged.insert(key, value);
        }

        self.render(template, &merged)
    }

    /// Render the sitemap template.
    pub fn render_sitemap(
        &self,
        template: &str,
        context: &SitemapContext<'_>,
    ) -> Result<String, RenderError> {
        self.render(template, context)
    }

    fn render<S: Serialize>(&self, template: &str, ctx: S) -> Result<String, RenderError> {
        let to_error = |e: minijinja::Error| RenderError::Template {
            template: template.to_string(),
            message: e.to_string(),
        };

        self.env
            .get_template(template)
            .map_err(to_error)?
            .render(ctx)
            .map_err(to_error)
    }
}

const BUILTIN_SITEMAP: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{%- for entry in entries %}
  <url>
    <loc>{{ entry.loc }}</loc>
  </url>
{%- endfor %}
</urlset>
"##;
