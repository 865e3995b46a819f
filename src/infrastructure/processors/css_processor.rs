use crate::utils::{Logger, OptimizeError, Result, Timer};
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions as CssParserOptions, StyleSheet},
};
use std::path::Path;

pub struct LightningCssProcessor {
    minify: bool,
}

impl LightningCssProcessor {
    pub fn new(minify: bool) -> Self {
        Self { minify }
    }

    /// Minify `content` with lightningcss.
    ///
    /// Stylesheets lightningcss rejects are still accepted: they fall back to a
    /// line-based minification and a warning is logged.
    pub fn process_css(&self, content: &str, path: &Path) -> Result<String> {
        let _timer = Timer::start(&format!(
            "Processing CSS {}",
            path.file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
        ));

        match self.lightningcss(content, path) {
            Ok(code) => Ok(code),
            Err(e) => {
                Logger::warn(&format!("{}, using fallback minification", e));
                Ok(self.fallback_minify(content))
            }
        }
    }

    fn lightningcss(&self, content: &str, path: &Path) -> Result<String> {
        let options = CssParserOptions {
            filename: path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let mut stylesheet = StyleSheet::parse(content, options).map_err(|e| {
            OptimizeError::minify(format!("CSS parse error in {}: {}", path.display(), e))
        })?;

        if self.minify {
            stylesheet
                .minify(MinifyOptions::default())
                .map_err(|e| OptimizeError::minify(format!("{}: {}", path.display(), e)))?;
        }

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: self.minify,
                ..Default::default()
            })
            .map_err(|e| OptimizeError::minify(format!("{}: {}", path.display(), e)))?;

        Ok(result.code)
    }

    fn fallback_minify(&self, content: &str) -> String {
        if self.minify {
            content
                .lines()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("")
        } else {
            content.to_string()
        }
    }

    /// Concatenate already-read stylesheets and process them as one unit
    pub fn bundle_css(&self, sources: &[String], bundle_path: &Path) -> Result<String> {
        let _timer = Timer::start("Bundling CSS files");

        let mut bundle = String::new();
        for source in sources {
            bundle.push('\n');
            bundle.push_str(source);
        }

        self.process_css(&bundle, bundle_path)
    }
}

impl Default for LightningCssProcessor {
    fn default() -> Self {
        Self::new(true)
    }
}
