// src/store/memory.rs
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::{ArticleStore, UpdateFilter};
use crate::error::StoreError;
use crate::model::Article;

/// In-process collection. Every update runs under one write lock, so a bulk
/// update is atomic with respect to concurrent readers and writers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Article>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            docs: RwLock::new(articles),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn insert(&self, article: Article) {
        self.docs.write().await.push(article);
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("memory store is closed".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArticleStore for MemoryStore {
    async fn update_many(&self, filter: &UpdateFilter, label: &str) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut docs = self.docs.write().await;
        let mut modified = 0u64;
        for doc in docs.iter_mut().filter(|d| filter.matches(d)) {
            doc.source = Some(label.to_string());
            modified += 1;
        }
        Ok(modified)
    }

    async fn find_all(&self) -> Result<Vec<Article>, StoreError> {
        self.ensure_open()?;
        Ok(self.docs.read().await.clone())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
