// tests/common/mod.rs
//
// Shared fixtures: a store that can be switched offline or slowed down, and
// a wall clock driven by tokio's (pausable) time.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tari_dashboard::error::StoreError;
use tari_dashboard::scheduler::Clock;
use tari_dashboard::store::{ArticleStore, MemoryStore, UpdateFilter};
use tari_dashboard::Article;

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub struct FlakyStore {
    pub inner: MemoryStore,
    offline: AtomicBool,
    delay: Option<Duration>,
}

impl FlakyStore {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            inner: MemoryStore::with_articles(articles),
            offline: AtomicBool::new(false),
            delay: None,
        }
    }

    pub fn slow(articles: Vec<Article>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(articles)
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArticleStore for FlakyStore {
    async fn update_many(&self, filter: &UpdateFilter, label: &str) -> Result<u64, StoreError> {
        self.check()?;
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.inner.update_many(filter, label).await
    }

    async fn find_all(&self) -> Result<Vec<Article>, StoreError> {
        self.check()?;
        self.inner.find_all().await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// `base` plus however much tokio time has elapsed since construction.
pub struct TokioClock {
    base: NaiveDateTime,
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: NaiveDateTime) -> Self {
        Self {
            base,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.base + elapsed
    }
}

pub fn sources(articles: &[Article]) -> Vec<Option<&str>> {
    articles.iter().map(|a| a.source.as_deref()).collect()
}
