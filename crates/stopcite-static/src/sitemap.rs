//! Page URLs and sitemap entries.

use std::collections::BTreeSet;

use serde::Serialize;

/// One `<url>` of the sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
    /// Language code
    pub lang: String,
    /// Absolute page URL
    pub loc: String,
}

/// Absolute URL of a language's page, always with a trailing slash.
pub fn page_url(site_url: &str, lang: &str, default_lang: &str) -> String {
    let base = site_url.trim_end_matches('/');
    if lang == default_lang {
        format!("{}/", base)
    } else {
        format!("{}/{}/", base, lang)
    }
}

/// Sitemap entries for the built languages, sorted by code without duplicates.
pub fn sitemap_entries<'a, I>(site_url: &str, langs: I, default_lang: &str) -> Vec<SitemapEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    langs
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|lang| SitemapEntry {
            lang: lang.to_string(),
            loc: page_url(site_url, lang, default_lang),
        })
        .collect()
}
