use crate::core::interfaces::{FileSystemService, Minifier};
use crate::core::models::{FileKind, FileResult, OptimizeOptions};
use crate::infrastructure::processors::{
    embed_static_css, inject_into_head, preload_modules, stylesheet_link, ModuleGraph,
};
use crate::utils::{Logger, Result};
use std::path::Path;

/// Optimizes one build-output file in place.
///
/// Shared read-only by every task of a run.
pub struct FileOptimizer<'a> {
    pub fs: &'a dyn FileSystemService,
    pub minifier: &'a dyn Minifier,
    pub options: &'a OptimizeOptions,
    /// Set for the whole run when any JS file imports a CSS proxy
    pub preload_css: bool,
    pub module_graph: Option<&'a ModuleGraph>,
}

impl FileOptimizer<'_> {
    pub async fn optimize(&self, file: &Path) -> Result<FileResult> {
        let kind = FileKind::classify(file, &self.options.naming);
        Logger::processing_file(file, kind.as_str());

        match kind {
            FileKind::Css => {
                self.optimize_css(file).await?;
                Ok(FileResult::default())
            }
            FileKind::JavaScript => self.optimize_js(file).await,
            FileKind::Html => {
                self.optimize_html(file).await?;
                Ok(FileResult::default())
            }
            FileKind::CssProxy | FileKind::Other => Ok(FileResult::default()),
        }
    }

    async fn optimize_css(&self, file: &Path) -> Result<()> {
        if !self.options.minify_css {
            return Ok(());
        }
        let code = self.fs.read_file(file).await?;
        let minified = self.minifier.minify_css(code, file).await?;
        self.fs.write_file(file, &minified).await
    }

    async fn optimize_js(&self, file: &Path) -> Result<FileResult> {
        let mut result = FileResult::default();
        if !self.preload_css && !self.options.minify_js {
            return Ok(result);
        }

        let original = self.fs.read_file(file).await?;
        let mut code = original.clone();

        if self.preload_css {
            let path = file.to_path_buf();
            let naming = self.options.naming.clone();
            let source = std::mem::take(&mut code);
            let embedded =
                tokio::task::spawn_blocking(move || embed_static_css(&path, &source, &naming))
                    .await??;
            code = embedded.code;
            result.css = embedded.imports;
        }

        if self.options.minify_js {
            code = self.minifier.minify_js(code, file).await?;
        }

        if code != original {
            self.fs.write_file(file, &code).await?;
        }
        Ok(result)
    }

    async fn optimize_html(&self, file: &Path) -> Result<()> {
        let module_graph = self.module_graph.filter(|_| self.options.preload_modules);
        if !self.preload_css && module_graph.is_none() && !self.options.minify_html {
            return Ok(());
        }

        let original = self.fs.read_file(file).await?;
        let mut code = original.clone();

        if self.preload_css {
            code = inject_into_head(&code, &stylesheet_link(&self.options.combined_css_name));
        }

        if let Some(graph) = module_graph {
            code = preload_modules(&code, file, graph);
        }

        if self.options.minify_html {
            code = self.minifier.minify_html(code).await?;
        }

        if code != original {
            self.fs.write_file(file, &code).await?;
        }
        Ok(())
    }
}
