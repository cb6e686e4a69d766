use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: FileKind,
    pub size: u64,
}

impl FileStat {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// Filesystem operations used around a checkout
#[async_trait]
pub trait FileSystemProvider: Send + Sync {
    /// `None` when nothing exists at `path`; symlinks are not followed
    async fn stat(&self, path: &Path) -> io::Result<Option<FileStat>>;

    /// Create a directory and any missing parents
    async fn create_directory(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or a whole tree; a missing path is not an error
    async fn delete(&self, path: &Path) -> io::Result<()>;

    /// Copy a file or tree, overwriting existing files
    async fn copy(&self, source: &Path, destination: &Path) -> io::Result<()>;

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`FileSystemProvider`] over the local disk
#[derive(Debug, Default, Clone)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystemProvider for LocalFileSystem {
    async fn stat(&self, path: &Path) -> io::Result<Option<FileStat>> {
        match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => {
                let file_type = metadata.file_type();
                let kind = if file_type.is_symlink() {
                    FileKind::Symlink
                } else if file_type.is_dir() {
                    FileKind::Directory
                } else {
                    FileKind::File
                };
                Ok(Some(FileStat {
                    kind,
                    size: metadata.len(),
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_directory(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn delete(&self, path: &Path) -> io::Result<()> {
        match self.stat(path).await? {
            None => Ok(()),
            Some(stat) if stat.is_dir() => tokio::fs::remove_dir_all(path).await,
            Some(_) => tokio::fs::remove_file(path).await,
        }
    }

    async fn copy(&self, source: &Path, destination: &Path) -> io::Result<()> {
        let source = source.to_path_buf();
        let destination = destination.to_path_buf();
        task::spawn_blocking(move || copy_tree(&source, &destination))
            .await
            .map_err(io::Error::other)?
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }
}

fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    if !fs::symlink_metadata(source)?.is_dir() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination)?;
        return Ok(());
    }

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let target: PathBuf = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    let points_to = fs::read_link(link)?;
    if fs::symlink_metadata(target).is_ok() {
        fs::remove_file(target)?;
    }
    std::os::unix::fs::symlink(points_to, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    fs::copy(link, target).map(|_| ())
}
