// src/store/mod.rs
pub mod file;
pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use regex::Regex;

use crate::error::StoreError;
use crate::model::Article;
use crate::window::Window;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Guard of one bulk tagging update: `url ~ pattern`, `source` absent,
/// `date` inside the window.
#[derive(Debug, Clone)]
pub struct UpdateFilter {
    pub pattern: Regex,
    pub window: Window,
}

impl UpdateFilter {
    pub fn new(pattern: Regex, window: Window) -> Self {
        Self { pattern, window }
    }

    pub fn matches(&self, article: &Article) -> bool {
        !article.is_tagged()
            && self.window.contains(article.date)
            && self.pattern.is_match(&article.url)
    }
}

/// The collection of article documents.
///
/// Each `update_many` call must be atomic with respect to every other call on
/// the same store; the tagger relies on nothing else.
#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    /// Set `source = label` on every document matching `filter`.
    /// Returns the number of modified documents.
    async fn update_many(&self, filter: &UpdateFilter, label: &str) -> Result<u64, StoreError>;

    async fn find_all(&self) -> Result<Vec<Article>, StoreError>;

    /// Release the handle. Later calls fail with `StoreError::Unavailable`.
    async fn close(&self) -> Result<(), StoreError>;

    fn name(&self) -> &'static str;
}

/// Open a store from a connection string:
/// - `memory:` → empty in-process store
/// - `file://<path>` or a bare path → JSON document file
pub async fn connect(url: &str) -> Result<Arc<dyn ArticleStore>> {
    let url = url.trim();
    if url.is_empty() {
        return Err(anyhow!("store url is empty"));
    }
    if url == "memory:" || url == "memory://" {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = match url.split_once("://") {
        Some(("file", rest)) => PathBuf::from(rest),
        Some((scheme, _)) => return Err(anyhow!("unsupported store scheme '{scheme}'")),
        None => PathBuf::from(url),
    };
    let store = JsonFileStore::open(&path)
        .await
        .with_context(|| format!("opening document file {}", path.display()))?;
    Ok(Arc::new(store))
}
