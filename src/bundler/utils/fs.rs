//! File system utilities for packaging.
//!
//! Provides file placement with automatic directory creation and
//! comprehensive error handling.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Whether two paths name the same existing file, including through
/// `.`/`..` components, symlinks and (on unix) hard links.
///
/// Paths that cannot be resolved (e.g. missing) are never the same file.
pub async fn same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let (Ok(a), Ok(b)) = (fs::metadata(a).await, fs::metadata(b).await) {
            return a.dev() == b.dev() && a.ino() == b.ino();
        }
    }
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Places `from` at `to` as a hard link, falling back to a copy when the
/// link cannot be made (e.g. across filesystems).
///
/// An existing destination is replaced, so repeated runs converge on the
/// same result. A destination that already resolves to `from` is left
/// untouched.
pub async fn link_or_copy(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "auxiliary file {from:?} does not exist or is not a file"
        )));
    }
    if same_file(from, to).await {
        log::debug!("{} is already in place", to.display());
        return Ok(());
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }

    match fs::remove_file(to).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err::<(), _>(e).fs_context("replacing file", to),
    }

    if let Err(e) = fs::hard_link(from, to).await {
        log::debug!(
            "hard link {} -> {} failed ({}), copying instead",
            from.display(),
            to.display(),
            e
        );
        copy_file(from, to).await?;
    }

    Ok(())
}
