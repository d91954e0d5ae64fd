//! Cache Storage
//!
//! Named caches mapping request URLs to stored responses. Owned by the
//! worker agent; versioned by cache-name tag.

use std::collections::HashMap;

use crate::fetch::Response;

/// Container for named caches
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: HashMap<String, Cache>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or create a cache
    pub fn open(&mut self, name: &str) -> &mut Cache {
        self.caches.entry(name.to_string()).or_default()
    }

    /// Look up a cache without creating it
    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Delete a cache and everything in it
    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    /// All cache names, sorted for deterministic iteration
    pub fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.keys().cloned().collect();
        names.sort();
        names
    }
}

/// A single named cache of URL -> response entries
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: HashMap<String, Response>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a response under a URL, replacing any previous entry
    pub fn put(&mut self, url: &str, response: Response) {
        self.entries.insert(url.to_string(), response);
    }

    /// Find a stored response
    pub fn match_url(&self, url: &str) -> Option<&Response> {
        self.entries.get(url)
    }

    pub fn delete(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.entries.keys().cloned().collect();
        urls.sort();
        urls
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_once() {
        let mut storage = CacheStorage::new();
        storage.open("v1").put("/", Response::ok("text/html", vec![1]));
        storage.open("v1").put("/a", Response::ok("text/css", vec![2]));
        assert_eq!(storage.keys(), vec!["v1".to_string()]);
        assert_eq!(storage.get("v1").unwrap().len(), 2);
    }

    #[test]
    fn test_put_replaces() {
        let mut cache = Cache::new();
        cache.put("/", Response::ok("text/html", vec![1]));
        cache.put("/", Response::ok("text/html", vec![2]));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.match_url("/").unwrap().body, vec![2]);
    }

    #[test]
    fn test_delete_cache() {
        let mut storage = CacheStorage::new();
        storage.open("old");
        storage.open("new");
        assert!(storage.delete("old"));
        assert!(!storage.delete("old"));
        assert_eq!(storage.keys(), vec!["new".to_string()]);
    }
}
