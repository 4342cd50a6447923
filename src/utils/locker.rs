//! File-based locking to prevent overlapping backup passes

use anyhow::{Context, Result};
use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Run `f` while holding an exclusive lock on `lock_path`
///
/// Returns `Ok(None)` without running `f` if another process holds the lock.
pub fn with_exclusive_lock<T, F>(lock_path: &Path, f: F) -> Result<Option<T>>
where
    F: FnOnce() -> T,
{
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create lock directory")?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .context(format!("Failed to open lock file: {:?}", lock_path))?;

    let mut lock = RwLock::new(file);
    let guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(e) if e.kind() == ErrorKind::WouldBlock => {
            warn!("Another backup pass holds {:?}, skipping", lock_path);
            return Ok(None);
        }
        Err(e) => return Err(e).context(format!("Failed to lock {:?}", lock_path)),
    };

    debug!("Acquired pass lock: {:?}", lock_path);
    let result = f();
    drop(guard);
    debug!("Released pass lock: {:?}", lock_path);

    Ok(Some(result))
}
