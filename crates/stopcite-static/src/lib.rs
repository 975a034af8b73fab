//! Static site generator for stopcitingai.com.
//!
//! Renders one self-contained page per translation, with fonts, stylesheet and
//! script inlined, plus a sitemap and a few copied static files.

pub mod assets;
pub mod builder;
pub mod fonts;
pub mod output;
pub mod sitemap;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder, DEFAULT_LANG, SITE_URL};
pub use fonts::{FontSpec, FontTable, DEFAULT_FONT};
