// ── Signal extraction ──
//
// Turns raw page markup into the numeric facts the scoring rules look at.
// Parsing is lenient: broken markup still yields a bundle, absent
// elements simply count as zero.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static SCRIPT: LazyLock<Selector> = LazyLock::new(|| selector("script"));
static STYLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"style, link[rel="stylesheet"]"#));

/// Facts extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalBundle {
    /// Characters of `<title>` text; 0 when there is no title.
    pub title_length: usize,
    pub has_meta_description: bool,
    pub meta_description_length: usize,
    pub h1_count: usize,
    pub image_count: usize,
    /// Images whose `alt` is missing or empty.
    pub images_without_alt: usize,
    pub total_link_count: usize,
    pub internal_link_count: usize,
    pub script_tag_count: usize,
    /// `<style>` blocks plus stylesheet links.
    pub style_tag_count: usize,
    pub content_byte_length: usize,
    pub has_lang_attribute: bool,
}

impl SignalBundle {
    /// Extract signals from `markup` fetched from `page_url`.
    ///
    /// `page_url` is only used to decide which absolute links are internal;
    /// an unparseable page URL makes every absolute link external.
    pub fn extract(markup: &str, page_url: &str) -> Self {
        let document = Html::parse_document(markup);
        let page_host = Url::parse(page_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned));

        let title_length = document
            .select(&TITLE)
            .next()
            .map_or(0, |t| t.text().map(|s| s.chars().count()).sum());

        let meta = document.select(&META_DESCRIPTION).next();
        let meta_description_length = meta
            .and_then(|m| m.value().attr("content"))
            .map_or(0, |c| c.chars().count());

        let mut image_count = 0;
        let mut images_without_alt = 0;
        for img in document.select(&IMG) {
            image_count += 1;
            if img.value().attr("alt").is_none_or(str::is_empty) {
                images_without_alt += 1;
            }
        }

        let mut total_link_count = 0;
        let mut internal_link_count = 0;
        for link in document.select(&LINK) {
            total_link_count += 1;
            let href = link.value().attr("href").unwrap_or_default();
            if is_internal(href, page_host.as_deref()) {
                internal_link_count += 1;
            }
        }

        let has_lang_attribute = document
            .root_element()
            .value()
            .attr("lang")
            .is_some_and(|lang| !lang.is_empty());

        Self {
            title_length,
            has_meta_description: meta.is_some(),
            meta_description_length,
            h1_count: document.select(&H1).count(),
            image_count,
            images_without_alt,
            total_link_count,
            internal_link_count,
            script_tag_count: document.select(&SCRIPT).count(),
            style_tag_count: document.select(&STYLE).count(),
            content_byte_length: markup.len(),
            has_lang_attribute,
        }
    }
}

/// Site-relative paths and absolute URLs on the page's own host.
fn is_internal(href: &str, page_host: Option<&str>) -> bool {
    if href.starts_with('/') {
        return true;
    }
    let Some(page_host) = page_host else {
        return false;
    };
    Url::parse(href)
        .ok()
        .is_some_and(|u| u.host_str() == Some(page_host))
}
