//! The storage directory and the path-safety rules every route goes through.

use crate::error::AppError;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs::{self, File};

/// Reduces a client-supplied name to its final path component.
///
/// Returns `None` when nothing usable is left (`""`, `"."`, `".."`, only
/// separators) or the name carries a NUL byte.
pub fn sanitize_file_name(raw: &str) -> Option<&str> {
    let is_separator = |c: char| c == '/' || c == '\\';
    let trimmed = raw.trim_end_matches(is_separator);
    let name = match trimmed.rfind(is_separator) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };

    match name {
        "" | "." | ".." => None,
        name if name.contains('\0') => None,
        name => Some(name),
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_exists(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::from(e).with_context(format!(
                "creating storage directory {}",
                self.root.display()
            ))
        })
    }

    /// Maps a client-supplied name to a path directly inside the root.
    pub fn resolve(&self, raw: &str) -> Option<PathBuf> {
        let name = sanitize_file_name(raw)?;
        let path = self.root.join(name);
        // a sanitized name is a single component, so this only fails on a bug above
        if path.parent() != Some(self.root.as_path()) {
            return None;
        }
        Some(path)
    }

    /// Entry names directly under the root, sorted by byte value.
    pub async fn list_names(&self) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Creates or truncates `path` and writes `contents` in full.
    pub async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }

    /// Opens a regular file for reading along with its length.
    ///
    /// Directories are reported as `NotFound`.
    pub async fn open(&self, path: &Path) -> io::Result<(File, u64)> {
        let file = File::open(path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
        }
        Ok((file, metadata.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("test.txt"), Some("test.txt"));
        assert_eq!(sanitize_file_name(".hidden"), Some(".hidden"));
        assert_eq!(sanitize_file_name("a..b"), Some("a..b"));
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), Some("passwd"));
        assert_eq!(sanitize_file_name("/abs/path/file.bin"), Some("file.bin"));
        assert_eq!(sanitize_file_name("C:\\Users\\me\\doc.pdf"), Some("doc.pdf"));
        assert_eq!(sanitize_file_name("dir/sub/"), Some("sub"));
        assert_eq!(sanitize_file_name("..\\..\\boot.ini"), Some("boot.ini"));
    }

    #[test]
    fn sanitize_rejects_empty_and_parent_refs() {
        for raw in ["", ".", "..", "/", "\\\\", "a/..", "../", "x/./", "bad\0name"] {
            assert_eq!(sanitize_file_name(raw), None, "input {raw:?}");
        }
    }

    #[test]
    fn resolve_stays_inside_root() {
        let storage = Storage::new("/srv/uploads");
        for raw in ["../../etc/passwd", "a/b\\c", "/etc/shadow", "..\\x", "plain"] {
            let path = storage.resolve(raw).expect("resolvable");
            assert_eq!(path.parent(), Some(Path::new("/srv/uploads")), "input {raw:?}");
        }
        assert_eq!(storage.resolve(".."), None);
    }

    #[tokio::test]
    async fn ensure_exists_creates_nested_root() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::new(tmp.path().join("a").join("b"));

        storage.ensure_exists().await.unwrap();
        storage.ensure_exists().await.unwrap();

        assert!(storage.root().is_dir());
    }

    #[tokio::test]
    async fn list_names_is_sorted_and_non_recursive() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::new(tmp.path());
        std::fs::write(tmp.path().join("b.txt"), b"b").unwrap();
        std::fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("nested").join("inner.txt"), b"x").unwrap();

        let names = storage.list_names().await.unwrap();

        assert_eq!(names, vec!["a.txt", "b.txt", "nested"]);
    }

    #[tokio::test]
    async fn open_treats_directories_as_missing() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::new(tmp.path());
        std::fs::create_dir(tmp.path().join("dir")).unwrap();

        let err = storage.open(&tmp.path().join("dir")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn write_overwrites_existing_content() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::new(tmp.path());
        let path = storage.resolve("note.txt").unwrap();

        storage.write(&path, b"first version").await.unwrap();
        storage.write(&path, b"v2").await.unwrap();

        let (_, len) = storage.open(&path).await.unwrap();
        assert_eq!(len, 2);
        assert_eq!(std::fs::read(&path).unwrap(), b"v2");
    }
}
