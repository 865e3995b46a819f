use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Byte offsets of one static import inside a single file's source.
///
/// `specifier_*` cover the module specifier without its quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportRecord {
    pub statement_start: usize,
    pub statement_end: usize,
    pub specifier_start: usize,
    pub specifier_end: usize,
}

impl ImportRecord {
    pub fn statement<'a>(&self, source: &'a str) -> &'a str {
        &source[self.statement_start..self.statement_end]
    }

    pub fn specifier<'a>(&self, source: &'a str) -> &'a str {
        &source[self.specifier_start..self.specifier_end]
    }
}

/// A CSS asset reached through its JS proxy from one build-output file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssImportEntry {
    pub actual: PathBuf,
    pub proxy: PathBuf,
}

/// What one file contributed to the run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResult {
    pub css: Vec<CssImportEntry>,
}

/// Result of embedding CSS imports into one JS source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedCss {
    pub imports: Vec<CssImportEntry>,
    pub code: String,
}

/// Build-output file categories the optimizer acts on. Anything else is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Css,
    JavaScript,
    Html,
    /// JS stand-in for a stylesheet. Skipped while files are optimized, since
    /// importers read it; minified afterwards only if nothing embedded it.
    CssProxy,
    Other,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "css" => FileKind::Css,
            "js" | "mjs" => FileKind::JavaScript,
            "html" => FileKind::Html,
            _ => FileKind::Other,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(path.extension().and_then(|s| s.to_str()).unwrap_or(""))
    }

    pub fn classify(path: &Path, naming: &ProxyNaming) -> Self {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if naming.is_css_proxy(name) {
            FileKind::CssProxy
        } else {
            Self::from_path(path)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Css => "css",
            FileKind::JavaScript => "js",
            FileKind::Html => "html",
            FileKind::CssProxy => "css proxy",
            FileKind::Other => "other",
        }
    }
}

/// Filename conventions linking a CSS asset to its JS proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyNaming {
    /// Appended to a CSS file name to form its proxy (`a.css` -> `a.css.proxy.js`)
    pub proxy_suffix: String,
    pub css_extension: String,
    /// CSS files ending with this carry a class-name mapping in their proxy
    pub module_marker: String,
}

impl Default for ProxyNaming {
    fn default() -> Self {
        Self {
            proxy_suffix: ".proxy.js".to_string(),
            css_extension: ".css".to_string(),
            module_marker: ".module.css".to_string(),
        }
    }
}

impl ProxyNaming {
    /// `.css.proxy.js`
    pub fn css_proxy_suffix(&self) -> String {
        format!("{}{}", self.css_extension, self.proxy_suffix)
    }

    pub fn is_css_proxy(&self, specifier: &str) -> bool {
        specifier.ends_with(&self.css_proxy_suffix())
    }

    /// Strip the proxy suffix, leaving the CSS asset's specifier
    pub fn actual_specifier<'a>(&self, specifier: &'a str) -> &'a str {
        specifier
            .strip_suffix(self.proxy_suffix.as_str())
            .unwrap_or(specifier)
    }

    pub fn is_css_module(&self, actual_specifier: &str) -> bool {
        actual_specifier.ends_with(&self.module_marker)
    }
}

/// User-facing switches. JSON keys follow the host bundler's option names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    #[serde(rename = "minifyJS")]
    pub minify_js: bool,
    #[serde(rename = "minifyHTML")]
    pub minify_html: bool,
    #[serde(rename = "minifyCSS")]
    pub minify_css: bool,
    #[serde(rename = "preloadModules")]
    pub preload_modules: bool,
    /// Root-relative URL of the combined stylesheet
    #[serde(rename = "combinedCSSName")]
    pub combined_css_name: String,
    pub exclude: Vec<String>,
    pub concurrency: usize,
    pub naming: ProxyNaming,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            minify_js: true,
            minify_html: true,
            minify_css: true,
            preload_modules: false,
            combined_css_name: "/imported-styles.css".to_string(),
            exclude: Vec::new(),
            concurrency: num_cpus::get(),
            naming: ProxyNaming::default(),
        }
    }
}

/// One invocation by the host bundler
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub build_directory: PathBuf,
    /// Relative to `build_directory`
    pub meta_directory: PathBuf,
    pub options: OptimizeOptions,
}

impl OptimizeRequest {
    pub const MANIFEST_FILE_NAME: &'static str = "optimize-manifest.json";
    pub const DEFAULT_META_DIR: &'static str = "_snowpack";

    pub fn new(build_directory: impl Into<PathBuf>) -> Self {
        Self {
            build_directory: build_directory.into(),
            meta_directory: PathBuf::from(Self::DEFAULT_META_DIR),
            options: OptimizeOptions::default(),
        }
    }

    pub fn with_meta_directory(mut self, meta_directory: impl Into<PathBuf>) -> Self {
        self.meta_directory = meta_directory.into();
        self
    }

    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.build_directory
            .join(&self.meta_directory)
            .join(Self::MANIFEST_FILE_NAME)
    }

    pub fn combined_css_path(&self) -> PathBuf {
        self.build_directory
            .join(crate::utils::remove_leading_slash(&self.options.combined_css_name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCssEntry {
    pub actual: String,
    pub proxy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFileEntry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<ManifestCssEntry>,
}

/// Serialized record of a run. `imports` is keyed (and so ordered) by root-relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub imports: BTreeMap<String, ManifestFileEntry>,
    pub generated: Vec<String>,
}

/// A file whose optimization failed; the run carried on without it
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: crate::utils::OptimizeError,
}

#[derive(Debug, Default)]
pub struct OptimizeReport {
    pub files_processed: usize,
    pub failures: Vec<FileFailure>,
    pub preload_css: bool,
    pub combined_css: Option<PathBuf>,
    pub removed_files: usize,
    pub manifest_path: PathBuf,
    pub elapsed: std::time::Duration,
}

impl std::fmt::Display for OptimizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Optimized {} files ({} failed) in {:.2?}",
            self.files_processed,
            self.failures.len(),
            self.elapsed
        )
    }
}
