//! Filesystem adapter backed by a single GitHub Gist.

mod cache;

pub use cache::{CacheState, CachedEntry, ListingCache};

use crate::client::GistClient;
use crate::errors::{GistError, GistErrorKind, GistResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Fallback content type when the API declares none.
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Metadata attributes of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    /// Path (the gist filename).
    pub path: String,
    /// Size in bytes.
    pub size: Option<u64>,
    /// Content type.
    pub content_type: Option<String>,
}

/// Visibility of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Publicly readable.
    Public,
    /// Readable only by the owner.
    Private,
}

/// Contract for filesystem-shaped storage backends.
///
/// Backends that have no native concept for an operation (directories,
/// per-file visibility, timestamps) must fail it with a not-supported
/// error rather than emulating it.
#[async_trait]
pub trait FilesystemAdapter: Send + Sync {
    /// Checks whether a file exists.
    async fn file_exists(&self, path: &str) -> GistResult<bool>;

    /// Checks whether a directory exists.
    async fn directory_exists(&self, path: &str) -> GistResult<bool>;

    /// Reads the full content of a file.
    async fn read(&self, path: &str) -> GistResult<String>;

    /// Writes a file, replacing any existing content.
    async fn write(&self, path: &str, contents: &str) -> GistResult<()>;

    /// Deletes a file.
    async fn delete(&self, path: &str) -> GistResult<()>;

    /// Moves a file.
    async fn move_file(&self, source: &str, destination: &str) -> GistResult<()>;

    /// Copies a file.
    async fn copy(&self, source: &str, destination: &str) -> GistResult<()>;

    /// Lists files under a path prefix; an empty prefix lists everything.
    async fn list_contents(&self, path: &str, deep: bool) -> GistResult<Vec<FileAttributes>>;

    /// Gets the size of a file.
    async fn file_size(&self, path: &str) -> GistResult<FileAttributes>;

    /// Gets the content type of a file.
    async fn mime_type(&self, path: &str) -> GistResult<FileAttributes>;

    /// Gets the last-modified time of a file.
    async fn last_modified(&self, path: &str) -> GistResult<FileAttributes>;

    /// Creates a directory.
    async fn create_directory(&self, path: &str) -> GistResult<()>;

    /// Deletes a directory.
    async fn delete_directory(&self, path: &str) -> GistResult<()>;

    /// Sets the visibility of a file.
    async fn set_visibility(&self, path: &str, visibility: Visibility) -> GistResult<()>;

    /// Gets the visibility of a file.
    async fn visibility(&self, path: &str) -> GistResult<Visibility>;
}

/// Filesystem adapter storing files as entries of one GitHub Gist.
///
/// The backing store is a flat namespace keyed by filename; "directories"
/// are a naming convention (prefix plus `/`) with no existence of their
/// own, so directory operations fail with a not-supported error.
///
/// Listing metadata is served from a lazy whole-gist cache that is
/// invalidated after every mutation. The cache mutex serializes load and
/// invalidate within one adapter instance; it does nothing for callers
/// sharing the gist across instances or processes, whose mutations stay
/// invisible here until the next reload.
pub struct GistAdapter {
    client: GistClient,
    /// Backing gist id. Transitions exactly once from absent to present
    /// when auto-create performs the first write; the write lock is held
    /// across that first upload so only one caller creates the gist.
    gist_id: RwLock<Option<String>>,
    auto_create: bool,
    cache: Mutex<ListingCache>,
}

impl GistAdapter {
    /// Creates an adapter over the given client.
    ///
    /// The gist id and auto-create flag come from the client
    /// configuration, which has already been validated: a missing id with
    /// auto-create disabled never reaches this point.
    pub fn new(client: GistClient) -> Self {
        let gist_id = client.config().gist_id.clone();
        let auto_create = client.config().auto_create;
        Self {
            client,
            gist_id: RwLock::new(gist_id),
            auto_create,
            cache: Mutex::new(ListingCache::new()),
        }
    }

    /// Returns the backing gist id, if one exists yet.
    ///
    /// With auto-create the id is assigned by the first successful write;
    /// callers must persist it themselves, the adapter holds it only for
    /// its own lifetime.
    pub async fn gist_id(&self) -> Option<String> {
        self.gist_id.read().await.clone()
    }

    /// Gets the underlying client.
    pub fn client(&self) -> &GistClient {
        &self.client
    }

    /// Loads the whole-gist listing into the cache if not already loaded,
    /// then runs `f` against the snapshot.
    async fn with_cache<T>(&self, f: impl FnOnce(&ListingCache) -> T) -> GistResult<T> {
        let mut cache = self.cache.lock().await;

        if !cache.is_loaded() {
            cache.begin_load();
            match self.load_entries().await {
                Ok(entries) => cache.complete_load(entries),
                Err(e) => {
                    cache.invalidate();
                    return Err(e);
                }
            }
        }

        Ok(f(&cache))
    }

    /// Fetches the listing snapshot from the remote gist.
    ///
    /// Before the first auto-created write there is no gist, so the
    /// listing is empty without a network call.
    async fn load_entries(&self) -> GistResult<HashMap<String, CachedEntry>> {
        let gist_id = self.gist_id.read().await.clone();
        let Some(gist_id) = gist_id else {
            debug!("no backing gist yet, listing is empty");
            return Ok(HashMap::new());
        };

        let gist = self.client.fetch_gist(&gist_id).await?;
        let entries = gist
            .files
            .into_iter()
            .map(|(name, file)| {
                (
                    name,
                    CachedEntry {
                        size: file.size,
                        raw_url: file.raw_url,
                        content_type: file.content_type,
                    },
                )
            })
            .collect();

        Ok(entries)
    }

    /// Drops the listing snapshot. Runs after every mutation, successful
    /// or not.
    async fn invalidate_cache(&self) {
        self.cache.lock().await.invalidate();
    }

    fn entry_attributes(path: &str, entry: &CachedEntry) -> FileAttributes {
        FileAttributes {
            path: path.to_string(),
            size: entry.size,
            content_type: Some(
                entry
                    .content_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            ),
        }
    }
}

#[async_trait]
impl FilesystemAdapter for GistAdapter {
    async fn file_exists(&self, path: &str) -> GistResult<bool> {
        self.with_cache(|cache| cache.contains(path))
            .await
            .map_err(|e| e.with_path(path.to_string()))
    }

    async fn directory_exists(&self, _path: &str) -> GistResult<bool> {
        // The store is flat; directories never exist.
        Ok(false)
    }

    async fn read(&self, path: &str) -> GistResult<String> {
        let gist_id = self.gist_id.read().await.clone();
        let Some(gist_id) = gist_id else {
            return Err(GistError::not_found(path));
        };

        let mut files = self.client.fetch_file_contents(&gist_id).await?;
        files.remove(path).ok_or_else(|| GistError::not_found(path))
    }

    async fn write(&self, path: &str, contents: &str) -> GistResult<()> {
        // Hold the id write lock across the upload so that when
        // auto-create races, exactly one first write creates the gist.
        let mut gist_id = self.gist_id.write().await;

        if gist_id.is_none() && !self.auto_create {
            return Err(GistError::new(
                GistErrorKind::MissingGistId,
                "No backing gist and auto_create is disabled",
            )
            .with_path(path.to_string()));
        }

        let result = self
            .client
            .create_or_update_file(path, contents, gist_id.as_deref())
            .await;

        match result {
            Ok(gist) => {
                if gist_id.is_none() {
                    info!(gist_id = %gist.id, "created backing gist on first write");
                    *gist_id = Some(gist.id);
                }
                drop(gist_id);
                self.invalidate_cache().await;
                Ok(())
            }
            Err(e) => {
                drop(gist_id);
                self.invalidate_cache().await;
                Err(e.with_path(path.to_string()))
            }
        }
    }

    async fn delete(&self, path: &str) -> GistResult<()> {
        let gist_id = self.gist_id.read().await.clone();
        let Some(gist_id) = gist_id else {
            return Err(GistError::not_found(path));
        };

        let result = self.client.delete_file(&gist_id, path).await;
        self.invalidate_cache().await;

        result.map(|_| ()).map_err(|e| e.with_path(path.to_string()))
    }

    async fn move_file(&self, source: &str, destination: &str) -> GistResult<()> {
        // Not atomic: a failure after the write but before the delete
        // leaves both files present. The first sub-error propagates
        // unchanged and nothing is rolled back.
        let content = self.read(source).await?;
        self.write(destination, &content).await?;
        self.delete(source).await
    }

    async fn copy(&self, source: &str, destination: &str) -> GistResult<()> {
        let content = self.read(source).await?;
        self.write(destination, &content).await
    }

    async fn list_contents(&self, path: &str, _deep: bool) -> GistResult<Vec<FileAttributes>> {
        // The namespace is flat, so shallow and deep listings coincide.
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        };

        let listed = self
            .with_cache(|cache| {
                cache
                    .entries()
                    .filter(|(name, _)| prefix.is_empty() || name.starts_with(&prefix))
                    .map(|(name, entry)| Self::entry_attributes(name, entry))
                    .collect::<Vec<_>>()
            })
            .await;

        match listed {
            Ok(files) => Ok(files),
            Err(e) => {
                // Enumeration degrades to an empty listing instead of
                // failing; every other operation surfaces the error.
                warn!(error = %e, "listing failed, returning empty result");
                Ok(Vec::new())
            }
        }
    }

    async fn file_size(&self, path: &str) -> GistResult<FileAttributes> {
        self.with_cache(|cache| {
            cache
                .get(path)
                .map(|entry| Self::entry_attributes(path, entry))
                .ok_or_else(|| GistError::not_found(path))
        })
        .await?
    }

    async fn mime_type(&self, path: &str) -> GistResult<FileAttributes> {
        self.file_size(path).await
    }

    async fn last_modified(&self, path: &str) -> GistResult<FileAttributes> {
        Err(GistError::not_supported(
            path,
            "The gist API does not provide file-level modification time",
        ))
    }

    async fn create_directory(&self, path: &str) -> GistResult<()> {
        Err(GistError::not_supported(
            path,
            "Gist storage does not support directories",
        ))
    }

    async fn delete_directory(&self, path: &str) -> GistResult<()> {
        Err(GistError::not_supported(
            path,
            "Gist storage does not support directories",
        ))
    }

    async fn set_visibility(&self, path: &str, _visibility: Visibility) -> GistResult<()> {
        Err(GistError::not_supported(
            path,
            "Gist visibility is set at gist level, not per file",
        ))
    }

    async fn visibility(&self, path: &str) -> GistResult<Visibility> {
        Err(GistError::not_supported(
            path,
            "Gist visibility is set at gist level, not per file",
        ))
    }
}
