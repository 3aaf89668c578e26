//! The document location sink.

use std::fmt;

use crate::query::QueryParams;
use crate::url_builder::join_url;

/// The current document's address.
///
/// Commits go through [`Location::replace`] so tweaking filters never adds
/// history entries; [`Location::push`] is there for real navigations.
pub trait Location: fmt::Debug {
    fn path(&self) -> &str;

    fn query(&self) -> &QueryParams;

    /// Replace the current history entry with `url`.
    fn replace(&mut self, url: &str);

    /// Navigate to `url`, adding a history entry.
    fn push(&mut self, url: &str);

    /// Number of history entries in this tab.
    fn history_len(&self) -> usize;

    fn href(&self) -> String {
        join_url(self.path(), self.query())
    }
}

/// Split `path?query#fragment` into path and query, dropping the fragment.
pub fn split_url(url: &str) -> (&str, &str) {
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    url.split_once('?').unwrap_or((url, ""))
}

/// In-memory location with a history stack.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    path: String,
    query: QueryParams,
    history: Vec<String>,
    replace_count: usize,
}

impl MemoryLocation {
    pub fn new(url: &str) -> Self {
        let (path, query) = split_url(url);
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query: QueryParams::parse(query),
            history: vec![url.to_string()],
            replace_count: 0,
        }
    }

    /// How many times the current entry has been replaced.
    pub fn replace_count(&self) -> usize {
        self.replace_count
    }

    fn load(&mut self, url: &str) {
        let (path, query) = split_url(url);
        if !path.is_empty() {
            self.path = path.to_string();
        }
        self.query = QueryParams::parse(query);
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location for MemoryLocation {
    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> &QueryParams {
        &self.query
    }

    fn replace(&mut self, url: &str) {
        self.load(url);
        self.replace_count += 1;
        let href = self.href();
        if let Some(current) = self.history.last_mut() {
            *current = href;
        }
    }

    fn push(&mut self, url: &str) {
        self.load(url);
        let href = self.href();
        self.history.push(href);
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }
}
