use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves a request path to raw bytes.
///
/// Implementations are shared across the load fan-out, hence `Send + Sync`.
pub trait AssetSource: Send + Sync {
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads request paths relative to a root directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirSource {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

/// In-memory path → bytes map. Useful for embedded assets and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.files.insert(path.into(), bytes);
        self
    }

    pub fn with(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no in-memory asset at `{path}`"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("textures")).expect("mkdir");
        std::fs::write(dir.path().join("textures/glass.bin"), b"abc").expect("write");

        let source = DirSource::new(dir.path());
        assert_eq!(source.read("textures/glass.bin").expect("read"), b"abc");
        assert_eq!(
            source.read("missing.bin").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn memory_source_reports_missing_paths() {
        let source = MemorySource::new().with("a", vec![1, 2]);
        assert_eq!(source.read("a").expect("present"), vec![1, 2]);
        assert_eq!(source.read("b").unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
