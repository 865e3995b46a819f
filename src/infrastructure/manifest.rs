use crate::core::interfaces::FileSystemService;
use crate::core::models::{
    CssImportEntry, FileResult, Manifest, ManifestCssEntry, ManifestFileEntry,
};
use crate::infrastructure::processors::LightningCssProcessor;
use crate::utils::{manifest_path, Logger, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Distinct CSS entries in first-seen order.
///
/// `results` must be in scan order, which makes the bundle deterministic.
pub fn unique_css_entries(results: &[(PathBuf, FileResult)]) -> Vec<&CssImportEntry> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for entry in results.iter().flat_map(|(_, result)| result.css.iter()) {
        if seen.insert(entry.actual.as_path()) {
            unique.push(entry);
        }
    }
    unique
}

/// Concatenate every distinct imported stylesheet and minify the whole.
///
/// Stylesheets missing from disk are skipped. `None` when nothing was read.
pub async fn concat_and_minify_css(
    fs: &dyn FileSystemService,
    results: &[(PathBuf, FileResult)],
    bundle_path: &Path,
) -> Result<Option<String>> {
    let mut sources = Vec::new();
    for entry in unique_css_entries(results) {
        match fs.read_file(&entry.actual).await {
            Ok(source) => sources.push(source),
            Err(e) => Logger::debug(&format!(
                "Skipping {} in combined CSS: {}",
                entry.actual.display(),
                e
            )),
        }
    }

    if sources.iter().all(|s| s.trim().is_empty()) {
        return Ok(None);
    }

    let bundle_path = bundle_path.to_path_buf();
    let combined = tokio::task::spawn_blocking(move || {
        LightningCssProcessor::new(true).bundle_css(&sources, &bundle_path)
    })
    .await??;

    Ok(Some(combined))
}

/// Delete the stylesheets and proxies that were embedded. Already-missing files are fine.
pub async fn remove_css_files(
    fs: &dyn FileSystemService,
    results: &[(PathBuf, FileResult)],
) -> Result<usize> {
    let mut removed = 0;
    for (_, result) in results {
        for entry in &result.css {
            for path in [&entry.actual, &entry.proxy] {
                if fs.remove_file_if_exists(path).await? {
                    removed += 1;
                }
            }
        }
    }
    Ok(removed)
}

pub fn build_manifest(
    build_directory: &Path,
    results: &[(PathBuf, FileResult)],
    generated: &[PathBuf],
) -> Manifest {
    let imports = results
        .iter()
        .map(|(file, result)| {
            let css = result
                .css
                .iter()
                .map(|entry| ManifestCssEntry {
                    actual: manifest_path(build_directory, &entry.actual),
                    proxy: manifest_path(build_directory, &entry.proxy),
                })
                .collect();
            (manifest_path(build_directory, file), ManifestFileEntry { css })
        })
        .collect();

    Manifest {
        imports,
        generated: generated
            .iter()
            .map(|path| manifest_path(build_directory, path))
            .collect(),
    }
}

pub async fn write_manifest(fs: &dyn FileSystemService, path: &Path, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_string(manifest)?;
    fs.write_file(path, &json).await?;
    Logger::manifest_written(path);
    Ok(())
}
