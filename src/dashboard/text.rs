// src/dashboard/text.rs
use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::model::Article;

/// Dance names counted by the ranking. "tari" itself is kept so that
/// "tari tari ..." phrasing is still visible.
pub const VALID_DANCE_NAMES: [&str; 21] = [
    "jaipong", "saman", "piring", "topeng", "gambyong", "kecak", "serimpi", "bedhaya", "reog",
    "ronggeng", "lengger", "tortor", "tandak", "zapin", "tari", "seblang", "seudati", "merak",
    "payung", "legong", "cakalele",
];

static RE_DANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tari\s+([a-zA-Z\-]+)").expect("static dance regex"));

const BUILTIN_STOPWORDS: &[&str] = &[
    "ada", "adalah", "agar", "akan", "aku", "anda", "antara", "apa", "atau", "bagi", "bahkan",
    "bahwa", "banyak", "baru", "belum", "beberapa", "begitu", "bisa", "boleh", "bukan", "cara",
    "dalam", "dan", "dapat", "dari", "daripada", "dengan", "di", "dia", "hanya", "harus",
    "hingga", "ini", "itu", "jadi", "jika", "juga", "kami", "kamu", "karena", "kata", "ke",
    "kepada", "ketika", "kita", "lagi", "lain", "lebih", "maka", "masih", "mereka", "namun",
    "oleh", "pada", "para", "pun", "saat", "saja", "sama", "sangat", "satu", "sebagai",
    "sebuah", "sedang", "sehingga", "sejak", "selain", "semua", "sendiri", "seperti",
    "serta", "setelah", "sudah", "tahun", "tak", "tapi", "telah", "tentang", "tersebut",
    "tetapi", "tidak", "untuk", "yaitu", "yakni", "yang",
];

/// Words left out of the frequency table.
#[derive(Debug, Clone, Default)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    pub fn builtin() -> Self {
        Self(BUILTIN_STOPWORDS.iter().map(|w| w.to_string()).collect())
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading stopwords from {}", path.display()))?;
        Ok(Self::from_lines(&content))
    }

    pub fn from_lines(content: &str) -> Self {
        Self(
            content
                .lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .collect(),
        )
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// `title + " " + content` per article, joined and lowercased. `None` when
/// no article carries either field.
pub fn combined_text<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Option<String> {
    let mut any_text = false;
    let parts: Vec<String> = articles
        .into_iter()
        .map(|a| {
            any_text |= a.title.is_some() || a.content.is_some();
            format!(
                "{} {}",
                a.title.as_deref().unwrap_or_default(),
                a.content.as_deref().unwrap_or_default()
            )
        })
        .collect();
    any_text.then(|| parts.join(" ").to_lowercase())
}

/// Word counts behind the word cloud: ASCII punctuation stripped, split on
/// whitespace, stopwords and words of two characters or fewer dropped.
pub fn word_frequencies(text: &str, stopwords: &Stopwords, top_n: usize) -> Vec<TermCount> {
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let words = cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !stopwords.contains(w));
    most_common(words, top_n)
}

/// Dance names following the word "tari", restricted to the known names.
pub fn dance_ranking(text: &str, top_n: usize) -> Vec<TermCount> {
    let names = RE_DANCE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|name| VALID_DANCE_NAMES.contains(name));
    most_common(names, top_n)
}

/// Highest counts first; equal counts keep first-seen order.
fn most_common<'a>(items: impl Iterator<Item = &'a str>, top_n: usize) -> Vec<TermCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TermCount> = Vec::new();
    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(item, counts.len());
                counts.push(TermCount {
                    term: item.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}
