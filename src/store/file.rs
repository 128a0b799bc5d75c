// src/store/file.rs
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{ArticleStore, UpdateFilter};
use crate::error::StoreError;
use crate::model::Article;

/// Collection persisted as one JSON array of article documents.
///
/// Documents are kept as raw JSON objects: a tagging update only inserts the
/// `source` key and leaves every other field exactly as it was on disk.
///
/// Each operation runs start to finish on the blocking pool while holding
/// the collection lock, so a caller that gives up waiting (a timed-out
/// update) cannot release the lock halfway through a write. Writes go to a
/// uniquely named temp file that is then renamed over the collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    inner: Arc<Collection>,
}

#[derive(Debug)]
struct Collection {
    path: PathBuf,
    lock: Mutex<()>,
    closed: AtomicBool,
}

impl JsonFileStore {
    /// Open (or lazily create) the collection at `path`. The file is parsed
    /// once up front so a file that is not a JSON array fails at startup.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let store = Self {
            inner: Arc::new(Collection {
                path: path.to_path_buf(),
                lock: Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
        };
        let documents = store.with_collection(|c| Ok(c.read_docs()?.len())).await?;
        tracing::info!(
            target: "store",
            path = %path.display(),
            documents,
            "opened document file"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Run `op` on the blocking pool under the collection lock.
    async fn with_collection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Collection) -> Result<T, StoreError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = inner.lock.lock().unwrap_or_else(|p| p.into_inner());
            op(&inner)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

impl Collection {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable(format!(
                "{} is closed",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn read_docs(&self) -> Result<Vec<Value>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "reading {}: {e}",
                    self.path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Malformed(format!("{}: {e}", self.path.display())))
    }

    fn write_docs(&self, docs: &[Value]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(docs)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(d) => d.to_path_buf(),
            None => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::Unavailable(format!("creating {}: {e}", dir.display())))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::Unavailable(format!("temp file in {}: {e}", dir.display())))?;
        tmp.write_all(&body)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::Unavailable(format!("writing {}: {e}", tmp.path().display())))?;
        tmp.persist(&self.path).map_err(|e| {
            StoreError::Unavailable(format!("replacing {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}

/// Typed view of one raw document; `None` for entries that are not objects.
fn as_article(doc: &Value) -> Option<Article> {
    if !doc.is_object() {
        return None;
    }
    serde_json::from_value(doc.clone()).ok()
}

/// The tagging guard is "no `source` key", so an explicit `null` counts as set.
fn set_source_if_matching(doc: &mut Value, filter: &UpdateFilter, label: &str) -> bool {
    let eligible = match doc.as_object() {
        Some(obj) => !obj.contains_key("source") && as_article(doc).is_some_and(|a| filter.matches(&a)),
        None => false,
    };
    if eligible {
        if let Some(obj) = doc.as_object_mut() {
            obj.insert("source".to_string(), Value::String(label.to_string()));
        }
    }
    eligible
}

#[async_trait::async_trait]
impl ArticleStore for JsonFileStore {
    async fn update_many(&self, filter: &UpdateFilter, label: &str) -> Result<u64, StoreError> {
        let filter = filter.clone();
        let label = label.to_string();
        self.with_collection(move |c| {
            c.ensure_open()?;
            let mut docs = c.read_docs()?;
            let mut modified = 0u64;
            for doc in docs.iter_mut() {
                if set_source_if_matching(doc, &filter, &label) {
                    modified += 1;
                }
            }
            if modified > 0 {
                c.write_docs(&docs)?;
            }
            Ok(modified)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Article>, StoreError> {
        self.with_collection(|c| {
            c.ensure_open()?;
            let docs = c.read_docs()?;
            let total = docs.len();
            let articles: Vec<Article> = docs.iter().filter_map(as_article).collect();
            if articles.len() < total {
                tracing::warn!(
                    target: "store",
                    path = %c.path.display(),
                    skipped = total - articles.len(),
                    "skipped entries that are not article documents"
                );
            }
            Ok(articles)
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        // Taking the lock waits for any in-flight write.
        self.with_collection(|c| {
            c.closed.store(true, Ordering::Release);
            Ok(())
        })
        .await
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
