//! Artifact store contract and the non-network implementations.
//!
//! | Store | Use |
//! |-------|-----|
//! | [`crate::s3::S3ArtifactStore`] | production bucket |
//! | [`LocalArtifactStore`] | directory tree, dry runs |
//! | [`MemoryArtifactStore`] | in-process, tests |

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;

use crate::TransferError;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransferError>> + Send + 'a>>;

/// Remote object storage holding the daily exports and run reports.
pub trait ArtifactStore: Send + Sync {
    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;

    fn download<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Vec<u8>>;

    fn upload<'a>(&'a self, local_path: &'a Path, destination_key: &'a str) -> StoreFuture<'a, ()>;
}

/// `folder` + `name`, inserting a `/` when the folder does not end in one.
pub fn join_key(folder: &str, name: &str) -> String {
    let folder = folder.trim();
    if folder.is_empty() {
        name.to_owned()
    } else if folder.ends_with('/') {
        format!("{folder}{name}")
    } else {
        format!("{folder}/{name}")
    }
}

/// Store key of a daily export.
pub fn artifact_key(folder: &str, token: &str, extension: &str) -> String {
    join_key(folder, &format!("{token}{extension}"))
}

/// Store backed by a directory; keys are relative paths under `root`.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, TransferError> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if key.trim().is_empty() || escapes {
            return Err(TransferError::InvalidKey {
                key: key.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let path = self.resolve(key)?;
            tokio::fs::try_exists(&path)
                .await
                .map_err(|error| TransferError::local_file(&path, error))
        })
    }

    fn download<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let path = self.resolve(key)?;
            tokio::fs::read(&path)
                .await
                .map_err(|error| TransferError::local_file(&path, error))
        })
    }

    fn upload<'a>(&'a self, local_path: &'a Path, destination_key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let destination = self.resolve(destination_key)?;
            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|error| TransferError::local_file(parent, error))?;
            }
            tokio::fs::copy(local_path, &destination)
                .await
                .map_err(|error| TransferError::local_file(local_path, error))?;
            Ok(())
        })
    }
}

/// In-process store keyed by object key.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.insert(key, body);
        self
    }

    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.into(), body.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.get(key).is_some()) })
    }

    fn download<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.get(key)
                .ok_or_else(|| TransferError::request(key, "no such object"))
        })
    }

    fn upload<'a>(&'a self, local_path: &'a Path, destination_key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let body = tokio::fs::read(local_path)
                .await
                .map_err(|error| TransferError::local_file(local_path, error))?;
            self.insert(destination_key, body);
            Ok(())
        })
    }
}
