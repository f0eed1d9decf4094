//! File store: the byte-oriented persistence behind the `/files` routes.
//!
//! Two implementations are provided:
//!
//! - [`DirStore`]: files under a base directory on disk, via `tokio::fs`.
//! - [`MemoryStore`]: an in-process map, handy for tests and embedding.
//!
//! Names are not validated or sanitised. A name containing `..` segments can
//! escape the base directory of a [`DirStore`]; callers exposing the server to
//! untrusted peers must account for that.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Read/write access to named byte blobs.
///
/// Futures must be `Send` so the connection task that awaits them can be spawned
/// onto the multi-threaded runtime.
pub trait FileStore: Send + Sync + 'static {
    /// Returns the full contents stored under `name`.
    fn read(&self, name: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Stores `contents` under `name`, creating or truncating it.
    fn write(&self, name: &str, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// A [`FileStore`] rooted at a directory on disk.
///
/// # Examples
///
/// ```
/// use courier::store::DirStore;
///
/// let store = DirStore::new("/tmp/served");
/// assert_eq!(store.resolve("a.txt"), std::path::Path::new("/tmp/served/a.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Creates a store that serves files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a store name to its on-disk path.
    ///
    /// Leading slashes are dropped so that an absolute-looking name still lands
    /// under the root (`/etc/x` resolves to `<root>/etc/x`).
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }
}

impl FileStore for DirStore {
    fn read(&self, name: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        let path = self.resolve(name);
        async move { tokio::fs::read(path).await }
    }

    fn write(&self, name: &str, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send {
        let path = self.resolve(name);
        let contents = contents.to_vec();
        async move { tokio::fs::write(path, contents).await }
    }
}

/// A [`FileStore`] kept entirely in memory.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

impl FileStore for MemoryStore {
    fn read(&self, name: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        let files = Arc::clone(&self.files);
        let name = name.to_owned();
        async move {
            files.read().await.get(&name).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no such file: {name}"))
            })
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send {
        let files = Arc::clone(&self.files);
        let name = name.to_owned();
        let contents = contents.to_vec();
        async move {
            files.write().await.insert(name, contents);
            Ok(())
        }
    }
}
