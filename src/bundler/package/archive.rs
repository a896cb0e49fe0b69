//! Zip assembly for plugin packages.
//!
//! Entry names are the source paths exactly as given (not normalized), so an
//! unpacking collaborator must cope with platform-shaped names. A path is
//! written at most once no matter how often it is listed.

use crate::bundler::{Error, Result, error::ErrorExt};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Removes repeated paths, keeping first occurrences in order.
pub fn dedup_paths(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    files
        .iter()
        .filter(|path| seen.insert(path.as_path()))
        .cloned()
        .collect()
}

/// Writes `files` into a new zip at `archive_path`, replacing any previous
/// archive. Returns the entry names in write order.
///
/// The archive itself is never added as an entry.
pub async fn write_zip(archive_path: &Path, files: &[PathBuf]) -> Result<Vec<String>> {
    let archive_path = archive_path.to_path_buf();
    let files: Vec<PathBuf> = dedup_paths(files)
        .into_iter()
        .filter(|f| *f != archive_path)
        .collect();

    tokio::task::spawn_blocking(move || write_zip_blocking(&archive_path, &files))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))?
}

fn write_zip_blocking(archive_path: &Path, files: &[PathBuf]) -> Result<Vec<String>> {
    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).fs_context("creating archive directory", parent)?;
    }

    // A previous archive is replaced by rename, never truncated in place,
    // so files sharing its inode keep their content.
    let partial = partial_path(archive_path);
    let entries = match write_entries(archive_path, &partial, files) {
        Ok(entries) => entries,
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
    };
    std::fs::rename(&partial, archive_path)
        .inspect_err(|_| {
            let _ = std::fs::remove_file(&partial);
        })
        .fs_context("moving archive into place", archive_path)?;

    Ok(entries)
}

fn partial_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    archive_path.with_file_name(name)
}

fn write_entries(archive_path: &Path, partial: &Path, files: &[PathBuf]) -> Result<Vec<String>> {
    let archive_error = |reason: String| Error::Archive {
        path: archive_path.to_path_buf(),
        reason,
    };

    let file = File::create(partial).fs_context("creating archive", partial)?;
    let mut writer = ZipWriter::new(file);
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let mut source = File::open(path).fs_context("opening file for archive", path)?;
        let name = path.to_string_lossy().into_owned();

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(file_mode(&source));

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| archive_error(format!("adding entry {name:?}: {e}")))?;
        std::io::copy(&mut source, &mut writer).fs_context("writing archive entry", path)?;

        log::debug!("Added {} to {}", name, archive_path.display());
        entries.push(name);
    }

    writer
        .finish()
        .map_err(|e| archive_error(format!("finalizing: {e}")))?;

    Ok(entries)
}

#[cfg(unix)]
fn file_mode(file: &File) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    file.metadata()
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_file: &File) -> u32 {
    0o644
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn repeated_paths_are_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("agent");
        let manifest = dir.path().join("manifest.json");
        let readme = dir.path().join("README.md");
        for (path, body) in [(&binary, "bin"), (&manifest, "{}"), (&readme, "docs")] {
            std::fs::write(path, body).unwrap();
        }
        let archive = dir.path().join("package.zip");

        let files = vec![
            binary.clone(),
            manifest.clone(),
            readme.clone(),
            readme.clone(),
            manifest.clone(),
            archive.clone(),
        ];
        let entries = write_zip(&archive, &files).await.unwrap();

        let expected: Vec<String> = [&binary, &manifest, &readme]
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, expected);
        assert_eq!(entry_names(&archive), expected);
    }

    #[tokio::test]
    async fn entry_content_matches_source() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        std::fs::write(&readme, "hello plugin").unwrap();
        let archive = dir.path().join("out/package.zip");

        write_zip(&archive, &[readme.clone()]).await.unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut entry = zip.by_name(&readme.to_string_lossy()).unwrap();
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello plugin");
    }

    #[tokio::test]
    async fn missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.txt");
        let err = write_zip(&dir.path().join("package.zip"), &[missing])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gone.txt"));
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("package.zip");
        std::fs::write(&archive, "previous").unwrap();

        write_zip(&archive, &[dir.path().join("gone.txt")])
            .await
            .unwrap_err();
        assert_eq!(std::fs::read_to_string(&archive).unwrap(), "previous");
        assert!(!dir.path().join("package.zip.partial").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn replacing_archive_keeps_hard_linked_files() {
        let dir = tempfile::tempdir().unwrap();
        let user_file = dir.path().join("notes.zip");
        std::fs::write(&user_file, "user data").unwrap();
        let archive = dir.path().join("out/package.zip");
        std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
        std::fs::hard_link(&user_file, &archive).unwrap();

        let readme = dir.path().join("README.md");
        std::fs::write(&readme, "docs").unwrap();
        write_zip(&archive, &[readme.clone()]).await.unwrap();

        assert_eq!(std::fs::read_to_string(&user_file).unwrap(), "user data");
        assert_eq!(entry_names(&archive), vec![readme.to_string_lossy().into_owned()]);
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let paths: Vec<PathBuf> = ["b", "a", "b", "c", "a"].iter().map(PathBuf::from).collect();
        let deduped = dedup_paths(&paths);
        assert_eq!(deduped, vec![PathBuf::from("b"), PathBuf::from("a"), PathBuf::from("c")]);
    }
}
