use crate::core::interfaces::Minifier;
use crate::infrastructure::processors::css_processor::LightningCssProcessor;
use crate::utils::{ErrorContext, Logger, OptimizeError, Result};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier as OxcAstMinifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// JavaScript minification using oxc
pub struct OxcMinifier {
    mangle: bool,
}

impl OxcMinifier {
    pub fn new() -> Self {
        Self { mangle: true }
    }

    pub fn minify(&self, source_code: &str, path: &Path) -> Result<String> {
        let allocator = Allocator::default();
        // build output is always ES modules
        let source_type = SourceType::from_path(path)
            .unwrap_or_else(|_| SourceType::mjs())
            .with_module(true);

        let parse_result = Parser::new(&allocator, source_code, source_type).parse();

        if parse_result.panicked || !parse_result.errors.is_empty() {
            let errors: Vec<String> = parse_result
                .errors
                .iter()
                .map(|e| format!("Parse error: {}", e))
                .collect();
            return Err(OptimizeError::parse_with_context(
                errors.join("\n"),
                ErrorContext::new().with_file(path.to_path_buf()),
            ));
        }

        let mut program = parse_result.program;
        let options = MinifierOptions {
            mangle: self.mangle.then(MangleOptions::default),
            compress: Some(CompressOptions::default()),
        };
        let minified = OxcAstMinifier::new(options).minify(&allocator, &mut program);

        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                ..Default::default()
            })
            .with_scoping(minified.scoping)
            .build(&program)
            .code;

        Ok(code)
    }
}

impl Default for OxcMinifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse whitespace and drop comments; inline scripts and styles are left as written
pub fn minify_html(html: &str) -> Result<String> {
    let cfg = minify_html::Cfg {
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        ..minify_html::Cfg::default()
    };

    let result = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8(result)
        .map_err(|_| OptimizeError::minify("HTML minification produced invalid UTF-8".to_string()))
}

/// Long-lived minifier shared by every file of a run.
///
/// CPU-bound work runs on a dedicated thread pool; the pool lives as long as
/// the service and is released on drop.
pub struct MinifierService {
    pool: rayon::ThreadPool,
    js: Arc<OxcMinifier>,
    css: Arc<LightningCssProcessor>,
}

impl MinifierService {
    pub fn start(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("minify-{}", i))
            .build()
            .map_err(|e| OptimizeError::ServiceSetup(e.to_string()))?;

        Logger::debug(&format!("Minifier service started with {} workers", workers));

        Ok(Self {
            pool,
            js: Arc::new(OxcMinifier::new()),
            css: Arc::new(LightningCssProcessor::new(true)),
        })
    }

    async fn run<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pool.spawn(move || {
            // receiver gone means the caller stopped waiting
            let _ = tx.send(job());
        });
        rx.await
            .map_err(|_| OptimizeError::Task("minifier worker dropped the job".to_string()))?
    }
}

impl Drop for MinifierService {
    fn drop(&mut self) {
        Logger::debug("Minifier service stopped");
    }
}

#[async_trait::async_trait]
impl Minifier for MinifierService {
    async fn minify_js(&self, code: String, path: &Path) -> Result<String> {
        let minifier = Arc::clone(&self.js);
        let path: PathBuf = path.to_path_buf();
        self.run(move || minifier.minify(&code, &path)).await
    }

    async fn minify_css(&self, code: String, path: &Path) -> Result<String> {
        let processor = Arc::clone(&self.css);
        let path: PathBuf = path.to_path_buf();
        self.run(move || processor.process_css(&code, &path)).await
    }

    async fn minify_html(&self, code: String) -> Result<String> {
        self.run(move || minify_html(&code)).await
    }
}
