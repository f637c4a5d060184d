//! Input file discovery
//!
//! Directory listings are filtered by extension and sorted by file name so
//! batch runs process files in a stable order.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{AppError, AppResult};

pub const STREAM_LIST_EXTENSIONS: [&str; 2] = ["txt", "csv"];
pub const M3U_EXTENSIONS: [&str; 2] = ["m3u", "m3u8"];
pub const PLAYLIST_EXTENSIONS: [&str; 4] = ["txt", "csv", "m3u", "m3u8"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// File stem used to pair files across directories
pub fn stem_of(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Regular files directly under `dir` with one of `extensions`, sorted by name
pub async fn list_files(dir: &Path, extensions: &[&str]) -> AppResult<Vec<PathBuf>> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Err(AppError::missing_directory(dir));
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::io(dir, e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::io(dir, e))? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();

    debug!("Discovered files dir={} count={}", dir.display(), files.len());
    Ok(files)
}

/// Group playlist files from several directories by file stem
///
/// Groups are ordered by first appearance (directory order, then file name);
/// files within a group keep directory order.
pub async fn group_by_stem(dirs: &[PathBuf]) -> AppResult<Vec<(String, Vec<PathBuf>)>> {
    let mut groups: Vec<(String, Vec<PathBuf>)> = Vec::new();
    for dir in dirs {
        for path in list_files(dir, &PLAYLIST_EXTENSIONS).await? {
            let Some(stem) = stem_of(&path) else {
                continue;
            };
            match groups.iter_mut().find(|(s, _)| *s == stem) {
                Some((_, paths)) => paths.push(path),
                None => groups.push((stem, vec![path])),
            }
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.TXT", "c.m3u", "notes.md"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let files = list_files(dir.path(), &STREAM_LIST_EXTENSIONS).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
    }

    #[tokio::test]
    async fn missing_directory_is_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_files(&dir.path().join("absent"), &M3U_EXTENSIONS)
            .await
            .unwrap_err();
        assert!(err.is_missing_input());
    }

    #[tokio::test]
    async fn groups_files_by_stem_across_directories() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("北京联通.txt"), "").unwrap();
        std::fs::write(first.path().join("天津电信.txt"), "").unwrap();
        std::fs::write(second.path().join("北京联通.m3u"), "").unwrap();

        let groups = group_by_stem(&[first.path().to_path_buf(), second.path().to_path_buf()])
            .await
            .unwrap();

        let beijing = groups.iter().find(|(s, _)| s == "北京联通").unwrap();
        assert_eq!(beijing.1.len(), 2);
        assert!(beijing.1[0].starts_with(first.path()));
        assert_eq!(groups.len(), 2);
    }
}
