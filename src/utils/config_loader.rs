use crate::core::models::{OptimizeOptions, ProxyNaming};
use crate::utils::{Logger, OptimizeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "optimize.config.json";

/// Configuration file format (optimize.config.json). Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeConfigFile {
    #[serde(rename = "minifyJS", skip_serializing_if = "Option::is_none")]
    pub minify_js: Option<bool>,

    #[serde(rename = "minifyHTML", skip_serializing_if = "Option::is_none")]
    pub minify_html: Option<bool>,

    #[serde(rename = "minifyCSS", skip_serializing_if = "Option::is_none")]
    pub minify_css: Option<bool>,

    #[serde(rename = "preloadModules", skip_serializing_if = "Option::is_none")]
    pub preload_modules: Option<bool>,

    #[serde(rename = "combinedCSSName", skip_serializing_if = "Option::is_none")]
    pub combined_css_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming: Option<ProxyNaming>,
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub minify_js: Option<bool>,
    pub minify_html: Option<bool>,
    pub minify_css: Option<bool>,
    pub preload_modules: Option<bool>,
    pub combined_css_name: Option<String>,
    pub exclude: Vec<String>,
    pub concurrency: Option<usize>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `path`, or look for optimize.config.json in `search_dir`
    pub fn load(explicit: Option<&Path>, search_dir: &Path) -> Result<Option<OptimizeConfigFile>> {
        let config_path: PathBuf = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(OptimizeError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let candidate = search_dir.join(CONFIG_FILE_NAME);
                if !candidate.exists() {
                    Logger::debug("No optimize.config.json found, using defaults");
                    return Ok(None);
                }
                candidate
            }
        };

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path)?;
        let config: OptimizeConfigFile = serde_json::from_str(&content).map_err(|e| {
            OptimizeError::config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;

        Ok(Some(config))
    }

    /// CLI > config file > defaults. Exclude globs from both sources are combined.
    pub fn merge(file_config: Option<OptimizeConfigFile>, cli: CliOverrides) -> Result<OptimizeOptions> {
        let base = file_config.unwrap_or_default();
        let defaults = OptimizeOptions::default();

        let mut exclude = base.exclude.unwrap_or_default();
        exclude.extend(cli.exclude);

        let concurrency = cli
            .concurrency
            .or(base.concurrency)
            .unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            return Err(OptimizeError::config("concurrency must be at least 1".to_string()));
        }

        let combined_css_name = cli
            .combined_css_name
            .or(base.combined_css_name)
            .unwrap_or(defaults.combined_css_name);
        if !combined_css_name.ends_with(".css") {
            return Err(OptimizeError::config(format!(
                "combinedCSSName must name a .css file, got {}",
                combined_css_name
            )));
        }

        Ok(OptimizeOptions {
            minify_js: cli.minify_js.or(base.minify_js).unwrap_or(defaults.minify_js),
            minify_html: cli.minify_html.or(base.minify_html).unwrap_or(defaults.minify_html),
            minify_css: cli.minify_css.or(base.minify_css).unwrap_or(defaults.minify_css),
            preload_modules: cli
                .preload_modules
                .or(base.preload_modules)
                .unwrap_or(defaults.preload_modules),
            combined_css_name,
            exclude,
            concurrency,
            naming: base.naming.unwrap_or(defaults.naming),
        })
    }
}
