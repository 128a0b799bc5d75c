// src/dashboard/display.rs
//! Display-layer view of stored articles. Nothing here is ever written back.

use crate::model::Article;

/// An article as shown on the dashboard: the stored label, or the fallback
/// when the tagger has not reached it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayArticle {
    pub source: String,
    pub article: Article,
}

pub fn with_display_source(articles: Vec<Article>, fallback: &str) -> Vec<DisplayArticle> {
    articles
        .into_iter()
        .map(|article| DisplayArticle {
            source: article
                .source
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
            article,
        })
        .collect()
}

/// Keep articles whose display source is allowed and selected.
/// An empty selection means every allowed source.
pub fn filter_sources(
    rows: Vec<DisplayArticle>,
    allowed: &[String],
    selected: &[String],
) -> Vec<DisplayArticle> {
    let selected = if selected.is_empty() { allowed } else { selected };
    rows.into_iter()
        .filter(|r| allowed.contains(&r.source) && selected.contains(&r.source))
        .collect()
}

/// Distinct display sources, first-seen order.
pub fn available_sources(rows: &[DisplayArticle]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for r in rows {
        if !out.contains(&r.source) {
            out.push(r.source.clone());
        }
    }
    out
}
