use crate::core::interfaces::{FileSystemService, Minifier};
use crate::core::models::*;
use crate::core::optimizer::FileOptimizer;
use crate::infrastructure::manifest::{
    build_manifest, concat_and_minify_css, remove_css_files, write_manifest,
};
use crate::infrastructure::processors::{has_css_import, ModuleGraph};
use crate::infrastructure::MinifierService;
use crate::utils::{manifest_path, Logger, Result, Timer};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Runs one optimization pass over a build output directory
pub struct OptimizeService {
    fs_service: Arc<dyn FileSystemService>,
    minifier: Option<Arc<dyn Minifier>>,
}

/// What the scan decided before any file is touched
struct ScanOutcome {
    files: Vec<PathBuf>,
    preload_css: bool,
    module_graph: Option<ModuleGraph>,
}

impl OptimizeService {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self {
            fs_service,
            minifier: None,
        }
    }

    /// Use `minifier` instead of starting a `MinifierService` per run
    pub fn with_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = Some(minifier);
        self
    }

    pub async fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeReport> {
        let started = Instant::now();
        let root = request.build_directory.as_path();
        let options = &request.options;
        let concurrency = options.concurrency.max(1);
        Logger::optimize_start(root, concurrency);

        let scan = self.scan(request).await?;

        let minifier = self.acquire_minifier(concurrency)?;
        let outcomes = {
            let optimizer = FileOptimizer {
                fs: self.fs_service.as_ref(),
                minifier: minifier.as_ref(),
                options,
                preload_css: scan.preload_css,
                module_graph: scan.module_graph.as_ref(),
            };
            Self::dispatch(&optimizer, &scan.files, concurrency).await
        };

        let mut results = Vec::with_capacity(scan.files.len());
        let mut failures = Vec::new();
        for (path, outcome) in scan.files.into_iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push((path, result)),
                Err(error) => {
                    Logger::file_failed(&path, &error.format_detailed());
                    failures.push(FileFailure { path, error });
                }
            }
        }

        if options.minify_js {
            let proxy_failures = self
                .minify_unused_proxies(minifier.as_ref(), &results, options)
                .await;
            results.retain(|(path, _)| !proxy_failures.iter().any(|f| &f.path == path));
            failures.extend(proxy_failures);
        }
        drop(minifier);

        let mut report = OptimizeReport {
            files_processed: results.len(),
            preload_css: scan.preload_css,
            manifest_path: request.manifest_path(),
            ..Default::default()
        };

        let generated = self.finalize(request, &results, &mut report).await?;

        let manifest = build_manifest(root, &results, &generated);
        write_manifest(self.fs_service.as_ref(), &report.manifest_path, &manifest).await?;

        report.failures = failures;
        report.elapsed = started.elapsed();
        Logger::summary(report.files_processed, report.failures.len(), report.elapsed);
        Ok(report)
    }

    async fn scan(&self, request: &OptimizeRequest) -> Result<ScanOutcome> {
        let _timer = Timer::start("Scanning build output");
        let root = request.build_directory.clone();
        let options = &request.options;

        let mut exclude = vec![format!("{}/**", manifest_path(Path::new(""), &request.meta_directory))];
        exclude.extend(options.exclude.iter().cloned());
        let files = self.fs_service.scan_build_output(&root, &exclude).await?;

        let js_files: Vec<PathBuf> = files
            .iter()
            .filter(|f| FileKind::classify(f, &options.naming) == FileKind::JavaScript)
            .cloned()
            .collect();
        Logger::found_files(files.len(), js_files.len());

        let naming = options.naming.clone();
        let preload_modules = options.preload_modules;
        let (preload_css, module_graph) = tokio::task::spawn_blocking(move || {
            let preload_css = match has_css_import(&js_files, &naming) {
                Ok(found) => found,
                Err(e) => {
                    // proxies stay in place, so unembedded imports keep working
                    Logger::warn(&format!("CSS import check failed, embedding disabled: {}", e));
                    false
                }
            };
            let graph = preload_modules.then(|| ModuleGraph::build(&root, &js_files, &naming));
            (preload_css, graph)
        })
        .await?;
        Logger::preload_css(preload_css);

        Ok(ScanOutcome {
            files,
            preload_css,
            module_graph,
        })
    }

    fn acquire_minifier(&self, concurrency: usize) -> Result<Arc<dyn Minifier>> {
        match &self.minifier {
            Some(minifier) => Ok(Arc::clone(minifier)),
            None => Ok(Arc::new(MinifierService::start(concurrency)?)),
        }
    }

    /// Run every file through `optimizer`, at most `concurrency` at a time.
    ///
    /// Outcomes come back indexed like `files`, whatever order tasks finish in.
    async fn dispatch(
        optimizer: &FileOptimizer<'_>,
        files: &[PathBuf],
        concurrency: usize,
    ) -> Vec<Result<FileResult>> {
        let _timer = Timer::start("Optimizing files");

        let mut slots: Vec<Option<Result<FileResult>>> = files.iter().map(|_| None).collect();
        let mut tasks = stream::iter(files.iter().enumerate())
            .map(|(index, file)| async move { (index, optimizer.optimize(file).await) })
            .buffer_unordered(concurrency);

        while let Some((index, outcome)) = tasks.next().await {
            slots[index] = Some(outcome);
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Ok(FileResult::default())))
            .collect()
    }

    /// Minify CSS proxies no file embedded. Runs after Draining, so no task is
    /// still reading a proxy's class map.
    async fn minify_unused_proxies(
        &self,
        minifier: &dyn Minifier,
        results: &[(PathBuf, FileResult)],
        options: &OptimizeOptions,
    ) -> Vec<FileFailure> {
        let consumed: HashSet<&Path> = results
            .iter()
            .flat_map(|(_, result)| result.css.iter())
            .map(|entry| entry.proxy.as_path())
            .collect();

        let mut failures = Vec::new();
        for (path, _) in results {
            if FileKind::classify(path, &options.naming) != FileKind::CssProxy
                || consumed.contains(path.as_path())
            {
                continue;
            }
            if let Err(error) = self.minify_in_place(minifier, path).await {
                Logger::file_failed(path, &error.format_detailed());
                failures.push(FileFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
        failures
    }

    async fn minify_in_place(&self, minifier: &dyn Minifier, path: &Path) -> Result<()> {
        let code = self.fs_service.read_file(path).await?;
        let minified = minifier.minify_js(code.clone(), path).await?;
        if minified != code {
            self.fs_service.write_file(path, &minified).await?;
        }
        Ok(())
    }

    /// Write the combined stylesheet and delete what it replaced. Returns generated files.
    async fn finalize(
        &self,
        request: &OptimizeRequest,
        results: &[(PathBuf, FileResult)],
        report: &mut OptimizeReport,
    ) -> Result<Vec<PathBuf>> {
        let mut generated = Vec::new();
        if !report.preload_css {
            return Ok(generated);
        }
        let _timer = Timer::start("Combining CSS");

        let output_css = request.combined_css_path();
        let fs = self.fs_service.as_ref();
        if let Some(combined) = concat_and_minify_css(fs, results, &output_css).await? {
            fs.write_file(&output_css, &combined).await?;
            Logger::combined_css_written(&output_css, combined.len());
            report.combined_css = Some(output_css.clone());
            generated.push(output_css);
        }

        report.removed_files = remove_css_files(fs, results).await?;
        Logger::removed_files(report.removed_files);
        Ok(generated)
    }
}
