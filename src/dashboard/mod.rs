// src/dashboard/mod.rs
//! Read path of the service: turns the stored articles into the tables the
//! front-end renders (monthly bar chart, word cloud, dance ranking).

pub mod display;
pub mod monthly;
pub mod text;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::config::DashboardCfg;
use crate::error::StoreError;
use crate::store::ArticleStore;

pub use display::{available_sources, filter_sources, with_display_source, DisplayArticle};
pub use monthly::{monthly_counts, MonthCount};
pub use text::{combined_text, dance_ranking, word_frequencies, Stopwords, TermCount};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardView {
    /// Sources the viewer may pick from.
    pub available: Vec<String>,
    /// Sources the tables below were computed for.
    pub selected: Vec<String>,
    pub total: usize,
    pub monthly: Vec<MonthCount>,
    /// `None` when the articles carry neither title nor content.
    pub words: Option<Vec<TermCount>>,
    pub dances: Option<Vec<TermCount>>,
}

pub struct Dashboard {
    store: Arc<dyn ArticleStore>,
    cfg: DashboardCfg,
    stopwords: Stopwords,
}

impl Dashboard {
    pub fn new(store: Arc<dyn ArticleStore>, cfg: DashboardCfg) -> Result<Self> {
        let stopwords = match &cfg.stopwords_path {
            Some(p) => Stopwords::from_path(p)?,
            None => Stopwords::builtin(),
        };
        Ok(Self::with_stopwords(store, cfg, stopwords))
    }

    pub fn with_stopwords(store: Arc<dyn ArticleStore>, cfg: DashboardCfg, stopwords: Stopwords) -> Self {
        Self {
            store,
            cfg,
            stopwords,
        }
    }

    async fn allowed_rows(&self) -> Result<Vec<DisplayArticle>, StoreError> {
        let articles = self.store.find_all().await?;
        let rows = with_display_source(articles, &self.cfg.fallback_label);
        Ok(filter_sources(rows, &self.cfg.allowed_sources, &[]))
    }

    pub async fn sources(&self) -> Result<Vec<String>, StoreError> {
        Ok(available_sources(&self.allowed_rows().await?))
    }

    /// Build all three tables for the selected sources (empty = all allowed).
    pub async fn view(&self, selected: &[String]) -> Result<DashboardView, StoreError> {
        let rows = self.allowed_rows().await?;
        let available = available_sources(&rows);

        let selected: Vec<String> = if selected.is_empty() {
            self.cfg.allowed_sources.clone()
        } else {
            selected.to_vec()
        };
        let rows = filter_sources(rows, &self.cfg.allowed_sources, &selected);
        let articles: Vec<_> = rows.iter().map(|r| &r.article).collect();

        let text = combined_text(articles.iter().copied());
        let words = text
            .as_deref()
            .map(|t| word_frequencies(t, &self.stopwords, self.cfg.top_words));
        let dances = text
            .as_deref()
            .map(|t| dance_ranking(t, self.cfg.top_dances));

        Ok(DashboardView {
            available,
            selected,
            total: articles.len(),
            monthly: monthly_counts(articles.iter().copied()),
            words,
            dances,
        })
    }
}
