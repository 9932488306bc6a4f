use crate::keys;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult, WrittenFile};
use async_trait::async_trait;
use bizdesk_core::{CategoryTable, UploadCategory};
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Private working directory for in-progress writes, relative to the root.
pub const STAGING_DIR: &str = ".staging";

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
    staging: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `root` - Upload root (e.g., "uploads"); created if missing and made absolute
    /// * `public_prefix` - URL prefix stored files are served under (e.g., "/uploads")
    pub async fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload root {}: {}",
                root.display(),
                e
            ))
        })?;

        let root = fs::canonicalize(&root).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize upload root: {}", e))
        })?;

        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&staging).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create staging directory {}: {}",
                staging.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            staging,
            public_prefix: public_prefix.into(),
        })
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging
    }

    /// Resolve `(category, filename)` to a path inside the category directory.
    ///
    /// Filenames are single path components; anything that could escape the
    /// category directory or collide with hidden/staging files is rejected.
    fn file_path(&self, category: UploadCategory, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.starts_with('.')
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains('\0')
        {
            return Err(StorageError::InvalidKey(
                "Filename contains invalid characters".to_string(),
            ));
        }

        Ok(self.root.join(category.directory()).join(filename))
    }
}

fn blocking_task_failed(err: tokio::task::JoinError) -> StorageError {
    StorageError::WriteFailed(format!("Blocking filesystem task failed: {}", err))
}

fn create_staging_file(staging: &Path) -> StorageResult<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".upload-")
        .suffix(".part")
        .tempfile_in(staging)
        .map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create staging file in {}: {}",
                staging.display(),
                e
            ))
        })
}

/// Shared between a persist task and the request that awaits it.
#[derive(Default)]
struct PersistState {
    persisted: AtomicBool,
    abandoned: AtomicBool,
}

/// Held across the await on a persist task. Dropped while armed (the request
/// was cancelled), it removes the final file if the task already moved it into
/// place; otherwise the task removes it after the move. Each side stores its
/// own flag before reading the other's, so at least one of them sees both.
struct PersistGuard {
    path: PathBuf,
    state: Arc<PersistState>,
    armed: bool,
}

impl PersistGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Arc::new(PersistState::default()),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PersistGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.abandoned.store(true, Ordering::SeqCst);
        if self.state.persisted.load(Ordering::SeqCst) {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to remove abandoned file"
                    );
                }
            }
        }
    }
}

/// Make the staged file readable and move it to `target` without replacing an
/// existing file. Runs on the blocking pool.
fn persist_staged(
    staged: NamedTempFile,
    target: &Path,
    filename: &str,
    state: &PersistState,
) -> StorageResult<()> {
    make_world_readable(staged.path()).map_err(|e| {
        StorageError::WriteFailed(format!("Failed to set file permissions: {}", e))
    })?;

    staged.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            StorageError::AlreadyExists(filename.to_string())
        } else {
            StorageError::WriteFailed(format!(
                "Failed to move file into {}: {}",
                target.display(),
                e.error
            ))
        }
    })?;

    state.persisted.store(true, Ordering::SeqCst);
    if state.abandoned.load(Ordering::SeqCst) {
        let _ = std::fs::remove_file(target);
    }
    Ok(())
}

#[cfg(unix)]
fn make_world_readable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_world_readable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl Storage for LocalStorage {
    async fn provision(&self, categories: &CategoryTable) -> StorageResult<()> {
        for spec in categories.iter() {
            let dir = self.root.join(spec.directory);
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create upload directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        fs::create_dir_all(&self.staging).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create staging directory {}: {}",
                self.staging.display(),
                e
            ))
        })?;

        tracing::info!(
            root = %self.root.display(),
            directories = categories.iter().count(),
            "Upload directories provisioned"
        );

        Ok(())
    }

    async fn write_stream<'a>(
        &self,
        category: UploadCategory,
        filename: &str,
        max_bytes: u64,
        mut stream: ByteStream<'a>,
    ) -> StorageResult<WrittenFile> {
        let final_path = self.file_path(category, filename)?;
        let start = std::time::Instant::now();

        // Removed on drop unless persisted, which covers errors and cancellation.
        let staging = self.staging.clone();
        let staged = tokio::task::spawn_blocking(move || create_staging_file(&staging))
            .await
            .map_err(blocking_task_failed)??;
        let handle = staged.as_file().try_clone().map_err(|e| {
            StorageError::WriteFailed(format!("Failed to open staging file: {}", e))
        })?;
        let mut file = fs::File::from_std(handle);

        let mut size: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(StorageError::StreamError)?;
            size += chunk.len() as u64;
            if size > max_bytes {
                tracing::debug!(
                    category = %category,
                    filename = %filename,
                    max_bytes,
                    "Upload exceeded size ceiling, discarding staged bytes"
                );
                return Err(StorageError::TooLarge { max: max_bytes });
            }
            file.write_all(&chunk).await.map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to write staging file {}: {}",
                    staged.path().display(),
                    e
                ))
            })?;
        }

        file.flush().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to flush staging file: {}", e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync staging file: {}", e))
        })?;
        drop(file);

        let guard = PersistGuard::new(final_path.clone());
        let state = guard.state.clone();
        let target = final_path.clone();
        let name = filename.to_string();
        tokio::task::spawn_blocking(move || persist_staged(staged, &target, &name, &state))
            .await
            .map_err(blocking_task_failed)??;
        guard.disarm();

        tracing::info!(
            path = %final_path.display(),
            category = %category,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(WrittenFile {
            path: final_path,
            size,
        })
    }

    async fn delete(&self, category: UploadCategory, filename: &str) -> StorageResult<bool> {
        let path = self.file_path(category, filename)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            category = %category,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(true)
    }

    fn discard(&self, category: UploadCategory, filename: &str) {
        let Ok(path) = self.file_path(category, filename) else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Discarded stored file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to discard stored file"
            ),
        }
    }

    async fn exists(&self, category: UploadCategory, filename: &str) -> StorageResult<bool> {
        let path = self.file_path(category, filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, category: UploadCategory, filename: &str) -> String {
        keys::public_url(&self.public_prefix, category, filename)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use bizdesk_core::UploadLimits;
    use bytes::Bytes;
    use futures::stream;
    use tempfile::tempdir;

    async fn provisioned(dir: &Path) -> LocalStorage {
        let storage = LocalStorage::new(dir.join("uploads"), "/uploads")
            .await
            .unwrap();
        let table = CategoryTable::new(&UploadLimits::default()).unwrap();
        storage.provision(&table).await.unwrap();
        storage
    }

    fn body(chunks: Vec<&'static str>) -> ByteStream<'static> {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes()))),
        ))
    }

    fn staging_entries(storage: &LocalStorage) -> usize {
        std::fs::read_dir(storage.staging_dir()).unwrap().count()
    }

    #[tokio::test]
    async fn test_provision_creates_all_directories() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        for name in ["images", "documents", "videos", "receipts", "avatars", "temp"] {
            assert!(storage.root().join(name).is_dir(), "{} missing", name);
        }
        assert!(storage.staging_dir().is_dir());
        assert!(storage.root().is_absolute());
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;
        let table = CategoryTable::new(&UploadLimits::default()).unwrap();
        assert!(storage.provision(&table).await.is_ok());
    }

    #[tokio::test]
    async fn test_write_stream_persists_file() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        let written = storage
            .write_stream(
                UploadCategory::Document,
                "1-abc.txt",
                1024,
                body(vec!["hello ", "world"]),
            )
            .await
            .unwrap();

        assert_eq!(written.size, 11);
        assert_eq!(written.path, storage.root().join("documents").join("1-abc.txt"));
        assert_eq!(std::fs::read(&written.path).unwrap(), b"hello world");
        assert_eq!(staging_entries(&storage), 0);
        assert!(storage
            .exists(UploadCategory::Document, "1-abc.txt")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_write_stream_accepts_exact_limit() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        let written = storage
            .write_stream(UploadCategory::Avatar, "1-abc.png", 4, body(vec!["ab", "cd"]))
            .await
            .unwrap();
        assert_eq!(written.size, 4);
    }

    #[tokio::test]
    async fn test_write_stream_over_limit_leaves_nothing() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        let result = storage
            .write_stream(UploadCategory::Avatar, "1-abc.png", 4, body(vec!["abc", "de"]))
            .await;

        assert!(matches!(result, Err(StorageError::TooLarge { max: 4 })));
        assert!(!storage.root().join("avatars").join("1-abc.png").exists());
        assert_eq!(staging_entries(&storage), 0);
    }

    #[tokio::test]
    async fn test_write_stream_error_leaves_nothing() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        let failing: ByteStream<'static> = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(ErrorKind::ConnectionReset, "client went away")),
        ]));

        let result = storage
            .write_stream(UploadCategory::Image, "1-abc.jpg", 1024, failing)
            .await;

        assert!(matches!(result, Err(StorageError::StreamError(_))));
        assert!(!storage.root().join("images").join("1-abc.jpg").exists());
        assert_eq!(staging_entries(&storage), 0);
    }

    #[tokio::test]
    async fn test_cancelled_write_leaves_nothing() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        // One chunk, then a stream that never yields again.
        let stalled: ByteStream<'static> = Box::pin(
            stream::iter(vec![Ok(Bytes::from_static(b"partial"))]).chain(stream::pending()),
        );

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            storage.write_stream(UploadCategory::Video, "1-abc.mp4", 1024, stalled),
        )
        .await;

        assert!(result.is_err());
        assert!(!storage.root().join("videos").join("1-abc.mp4").exists());
        assert_eq!(staging_entries(&storage), 0);
    }

    #[test]
    fn test_abandoned_persist_removes_moved_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1-abc.png");
        std::fs::write(&path, b"moved").unwrap();

        let guard = PersistGuard::new(path.clone());
        guard.state.persisted.store(true, Ordering::SeqCst);
        drop(guard);

        assert!(!path.exists());
    }

    #[test]
    fn test_abandoned_persist_keeps_file_it_did_not_move() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1-abc.png");
        std::fs::write(&path, b"someone else's").unwrap();

        let guard = PersistGuard::new(path.clone());
        let state = guard.state.clone();
        drop(guard);

        assert!(state.abandoned.load(Ordering::SeqCst));
        assert_eq!(std::fs::read(&path).unwrap(), b"someone else's");
    }

    #[test]
    fn test_persist_after_abandon_removes_file() {
        let dir = tempdir().unwrap();
        let staged = create_staging_file(dir.path()).unwrap();
        let target = dir.path().join("1-abc.mp4");

        let state = PersistState::default();
        state.abandoned.store(true, Ordering::SeqCst);
        persist_staged(staged, &target, "1-abc.mp4", &state).unwrap();

        assert!(state.persisted.load(Ordering::SeqCst));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_write_stream_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        storage
            .write_stream(UploadCategory::Generic, "1-abc", 1024, body(vec!["first"]))
            .await
            .unwrap();
        let result = storage
            .write_stream(UploadCategory::Generic, "1-abc", 1024, body(vec!["second"]))
            .await;

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        let path = storage.root().join("temp").join("1-abc");
        assert_eq!(std::fs::read(path).unwrap(), b"first");
        assert_eq!(staging_entries(&storage), 0);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        let result = storage
            .write_stream(UploadCategory::Image, "../escape.png", 1024, body(vec!["x"]))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete(UploadCategory::Image, "../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists(UploadCategory::Image, ".staging").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        storage
            .write_stream(UploadCategory::Receipt, "1-abc.png", 1024, body(vec!["x"]))
            .await
            .unwrap();

        assert!(storage.delete(UploadCategory::Receipt, "1-abc.png").await.unwrap());
        assert!(!storage.delete(UploadCategory::Receipt, "1-abc.png").await.unwrap());
        assert!(!storage
            .exists(UploadCategory::Receipt, "1-abc.png")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_discard_removes_file() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;

        storage
            .write_stream(UploadCategory::Image, "1-abc.gif", 1024, body(vec!["x"]))
            .await
            .unwrap();
        storage.discard(UploadCategory::Image, "1-abc.gif");
        storage.discard(UploadCategory::Image, "1-abc.gif");

        assert!(!storage.root().join("images").join("1-abc.gif").exists());
    }

    #[tokio::test]
    async fn test_public_url() {
        let dir = tempdir().unwrap();
        let storage = provisioned(dir.path()).await;
        assert_eq!(
            storage.public_url(UploadCategory::Avatar, "1-abc.png"),
            "/uploads/avatars/1-abc.png"
        );
    }
}
