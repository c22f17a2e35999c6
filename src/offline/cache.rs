//! On-disk cache stores
//!
//! A `CacheStorage` root holds one directory per named store. Each entry is
//! a JSON metadata file plus a body file, both named after a hash of
//! `"METHOD url"`. The full key is kept in the metadata and compared on
//! lookup, so a hash collision reads as a miss.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A stored response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub stored_at: DateTime<Utc>,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn new(method: &str, url: &str, status: u16, body: Vec<u8>) -> Self {
        Self {
            method: method.to_uppercase(),
            url: url.to_string(),
            status,
            headers: Vec::new(),
            stored_at: Utc::now(),
            body,
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    fn key(&self) -> String {
        cache_key(&self.method, &self.url)
    }
}

fn cache_key(method: &str, url: &str) -> String {
    format!("{} {}", method.to_uppercase(), url)
}

fn file_stem(key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Collection of named stores under one directory
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of every store on disk, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list {}", self.root.display()))
            }
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn has(&self, name: &str) -> bool {
        tokio::fs::metadata(self.root.join(name))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Remove a whole store. Returns false when it did not exist.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.root.join(name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", dir.display())),
        }
    }

    /// Handle to a store; the directory is created on first write
    pub fn open(&self, name: &str) -> CacheStore {
        CacheStore {
            name: name.to_string(),
            dir: self.root.join(name),
        }
    }
}

/// One named store
#[derive(Debug, Clone)]
pub struct CacheStore {
    name: String,
    dir: PathBuf,
}

impl CacheStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn paths(&self, key: &str) -> (PathBuf, PathBuf) {
        let stem = file_stem(key);
        (
            self.dir.join(format!("{}.json", stem)),
            self.dir.join(format!("{}.body", stem)),
        )
    }

    pub async fn put(&self, response: &CachedResponse) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let (meta_path, body_path) = self.paths(&response.key());
        // body first: metadata without a body is never visible
        write_atomic(&body_path, &response.body).await?;
        let meta = serde_json::to_vec_pretty(response)?;
        write_atomic(&meta_path, &meta).await?;
        tracing::trace!("Cached {} in {}", response.key(), self.name);
        Ok(())
    }

    /// Write every response, or none if any cannot be written
    pub async fn put_all(&self, responses: &[CachedResponse]) -> Result<()> {
        let mut written: Vec<String> = Vec::new();
        for response in responses {
            if let Err(e) = self.put(response).await {
                for done in &written {
                    self.remove(done).await.ok();
                }
                return Err(e);
            }
            written.push(response.key());
        }
        Ok(())
    }

    /// Stored response for `method` + `url`, if any
    pub async fn lookup(&self, method: &str, url: &str) -> Result<Option<CachedResponse>> {
        let key = cache_key(method, url);
        let (meta_path, body_path) = self.paths(&key);

        let meta = match tokio::fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", meta_path.display()))
            }
        };
        let mut response: CachedResponse = match serde_json::from_slice(&meta) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Ignoring corrupt cache entry {}: {}", meta_path.display(), e);
                return Ok(None);
            }
        };
        if response.key() != key {
            return Ok(None);
        }
        response.body = match tokio::fs::read(&body_path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", body_path.display()))
            }
        };
        Ok(Some(response))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let (meta_path, body_path) = self.paths(key);
        for path in [meta_path, body_path] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Number of entries in the store
    pub async fn len(&self) -> Result<usize> {
        let mut count = 0;
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let path = path.to_path_buf();
    let bytes = bytes.to_vec();
    // each writer gets its own temp file, so concurrent puts of one key never collide
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create a temp file in {}", dir.display()))?;
        tmp.write_all(&bytes)
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    })
    .await
    .context("Cache write task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_lookup() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::new(dir.path());
        let store = storage.open("v1");

        let response = CachedResponse::new("get", "http://up/static/app.js", 200, b"js".to_vec())
            .with_headers(vec![("content-type".into(), "text/javascript".into())]);
        store.put(&response).await.unwrap();

        let hit = store.lookup("GET", "http://up/static/app.js").await.unwrap().unwrap();
        assert_eq!(hit.body, b"js");
        assert_eq!(hit.status, 200);
        assert_eq!(hit.headers[0].1, "text/javascript");

        assert!(store.lookup("POST", "http://up/static/app.js").await.unwrap().is_none());
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_keys_and_delete() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::new(dir.path().join("cache"));
        assert!(storage.keys().await.unwrap().is_empty());

        for name in ["b", "a"] {
            storage
                .open(name)
                .put(&CachedResponse::new("GET", "/", 200, Vec::new()))
                .await
                .unwrap();
        }
        assert_eq!(storage.keys().await.unwrap(), vec!["a", "b"]);
        assert!(storage.delete("a").await.unwrap());
        assert!(!storage.delete("a").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CacheStorage::new(dir.path()).open("nope");
        assert!(store.is_empty().await.unwrap());
        assert!(store.lookup("GET", "/").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_of_one_key() {
        let dir = TempDir::new().unwrap();
        let store = CacheStorage::new(dir.path()).open("v1");
        let responses: Vec<_> = (0..16)
            .map(|i| CachedResponse::new("GET", "http://up/index.html", 200, vec![i]))
            .collect();

        let results = futures::future::join_all(responses.iter().map(|r| store.put(r))).await;
        assert!(results.iter().all(Result::is_ok), "{:?}", results);

        assert_eq!(store.len().await.unwrap(), 1);
        let hit = store.lookup("GET", "http://up/index.html").await.unwrap().unwrap();
        assert_eq!(hit.body.len(), 1);
    }

    #[tokio::test]
    async fn test_put_all_writes_every_response() {
        let dir = TempDir::new().unwrap();
        let store = CacheStorage::new(dir.path()).open("v1");
        let responses = vec![
            CachedResponse::new("GET", "http://up/", 200, b"index".to_vec()),
            CachedResponse::new("GET", "http://up/app.js", 200, b"js".to_vec()),
        ];
        store.put_all(&responses).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
    }
}
