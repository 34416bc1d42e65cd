use super::{parent_dir, StorageBackend, StorageResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Files documents into a directory on the local file system.
///
/// Writes go to a temporary file in the destination folder first and are
/// renamed into place, so an interrupted copy never leaves a partial file
/// under the final name.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Stage `fill` into a temp file beside `target`, then rename over it.
    fn write_atomically<F>(&self, target: &Path, fill: F) -> StorageResult<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let dir = target.parent().unwrap_or(&self.root);
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        fill(staged.as_file_mut())?;
        staged.as_file_mut().sync_all()?;
        staged.persist(target).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Default for LocalBackend {
    /// `~/Documents`
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join("Documents"))
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn store(&self, source: &Path, dest_path: &str) -> StorageResult<String> {
        self.ensure_directory(parent_dir(dest_path))?;
        let target = self.full_path(dest_path);

        let mut input = File::open(source)?;
        self.write_atomically(&target, |out| io::copy(&mut input, out).map(|_| ()))?;

        tracing::info!(
            "Filed {} -> {}",
            source.file_name().unwrap_or_default().to_string_lossy(),
            target.display()
        );
        Ok(target.display().to_string())
    }

    fn write_metadata(&self, content: &str, path: &str) -> StorageResult<String> {
        self.ensure_directory(parent_dir(path))?;
        let target = self.full_path(path);
        self.write_atomically(&target, |out| out.write_all(content.as_bytes()))?;
        Ok(target.display().to_string())
    }

    fn ensure_directory(&self, path: &str) -> StorageResult<()> {
        fs::create_dir_all(self.full_path(path))?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.full_path(path).exists()
    }
}
