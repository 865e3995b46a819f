use crate::utils::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File system operations on a build output directory
#[async_trait]
pub trait FileSystemService: Send + Sync {
    /// Every regular file under `root`, skipping root-relative paths matched by `exclude`
    async fn scan_build_output(&self, root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>>;
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn create_directory(&self, path: &Path) -> Result<()>;
    /// `Ok(false)` when there was nothing to remove
    async fn remove_file_if_exists(&self, path: &Path) -> Result<bool>;
}

/// Text minifiers shared by all concurrent file tasks
#[async_trait]
pub trait Minifier: Send + Sync {
    async fn minify_js(&self, code: String, path: &Path) -> Result<String>;
    async fn minify_css(&self, code: String, path: &Path) -> Result<String>;
    async fn minify_html(&self, code: String) -> Result<String>;
}
