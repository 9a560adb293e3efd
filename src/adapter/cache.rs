//! In-process listing cache for the Gist adapter.

use std::collections::HashMap;

/// Cached metadata for one file in the backing gist.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    /// Size in bytes.
    pub size: Option<u64>,
    /// Raw-content URL.
    pub raw_url: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
}

/// Cache lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// No listing has been fetched, or the last one was invalidated.
    Unloaded,
    /// A whole-gist fetch is in flight.
    Loading,
    /// A complete listing snapshot is held.
    Loaded,
}

/// Lazy whole-gist listing cache.
///
/// State machine: `Unloaded -> Loading -> Loaded`, with every mutation on
/// the owning adapter forcing `Loaded -> Unloaded`. The snapshot is
/// authoritative only between a successful load and the next mutating
/// call on the same adapter instance; external edits to the gist (e.g.
/// through the website) are invisible until the next reload. Callers must
/// serialize access: a load racing an invalidate can reinstate a stale
/// snapshot, which is why the adapter keeps this behind a mutex.
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: HashMap<String, CachedEntry>,
    state: State,
}

#[derive(Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

impl ListingCache {
    /// Creates an unloaded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current lifecycle state.
    pub fn state(&self) -> CacheState {
        match self.state {
            State::Unloaded => CacheState::Unloaded,
            State::Loading => CacheState::Loading,
            State::Loaded => CacheState::Loaded,
        }
    }

    /// Returns true if a complete snapshot is held.
    pub fn is_loaded(&self) -> bool {
        self.state == State::Loaded
    }

    /// Marks a whole-gist fetch as started.
    pub fn begin_load(&mut self) {
        self.entries.clear();
        self.state = State::Loading;
    }

    /// Stores a complete snapshot, finishing a load.
    pub fn complete_load(&mut self, entries: HashMap<String, CachedEntry>) {
        self.entries = entries;
        self.state = State::Loaded;
    }

    /// Drops the snapshot unconditionally.
    ///
    /// Called after every mutation, whether or not the remote call
    /// succeeded: a failed write must not leave a partially current
    /// snapshot behind. The cache is refetched in full on the next query,
    /// never patched in place.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.state = State::Unloaded;
    }

    /// Looks up one entry by filename.
    pub fn get(&self, path: &str) -> Option<&CachedEntry> {
        self.entries.get(path)
    }

    /// Returns true if the snapshot contains the filename.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Iterates over all cached entries.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &CachedEntry)> {
        self.entries.iter()
    }
}
