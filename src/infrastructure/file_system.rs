use crate::core::interfaces::FileSystemService;
use crate::utils::{manifest_path, OptimizeError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

pub struct TokioFileSystemService;

/// `*` stays within one path segment, like the host's glob ignore list
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[async_trait::async_trait]
impl FileSystemService for TokioFileSystemService {
    async fn scan_build_output(&self, root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
        let exclude_set = build_exclude_set(exclude)?;
        let root = root.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    OptimizeError::Io(e.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
                    }))
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.into_path();
                if exclude_set.is_match(manifest_path(&root, &path)) {
                    continue;
                }
                files.push(path);
            }
            Ok(files)
        })
        .await?
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).await.map_err(OptimizeError::Io)
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            self.create_directory(parent).await?;
        }

        fs::write(path, content).await.map_err(OptimizeError::Io)
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(OptimizeError::Io)
    }

    async fn remove_file_if_exists(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(OptimizeError::Io(e)),
        }
    }
}
