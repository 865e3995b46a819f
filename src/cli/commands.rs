use clap::{Parser, Subcommand};
use css_inline_optimizer::core::{OptimizeRequest, OptimizeService};
use css_inline_optimizer::infrastructure::{scan_imports, TokioFileSystemService};
use css_inline_optimizer::utils::{
    CliOverrides, ConfigLoader, Logger, OptimizeError, Result,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "css-inline-optimizer")]
#[command(about = "Minify a static build and turn JS-wrapped CSS back into stylesheets")]
pub struct Cli {
    /// Log every file and phase
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Optimize a build output directory in place
    Optimize {
        /// Build output directory
        build_dir: PathBuf,
        /// Metadata directory, relative to the build directory
        #[arg(long, default_value = OptimizeRequest::DEFAULT_META_DIR)]
        meta_dir: PathBuf,
        /// Glob of build files to leave alone (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
        /// Skip JavaScript minification
        #[arg(long)]
        no_minify_js: bool,
        /// Skip HTML minification
        #[arg(long)]
        no_minify_html: bool,
        /// Skip CSS minification
        #[arg(long)]
        no_minify_css: bool,
        /// Add modulepreload hints to HTML pages
        #[arg(long)]
        preload_modules: bool,
        /// Root-relative URL of the combined stylesheet
        #[arg(long)]
        combined_css_name: Option<String>,
        /// Files optimized at once (default: CPU count)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Config file (default: optimize.config.json next to the build directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Log the static imports of a JavaScript file
    Scan {
        file: PathBuf,
    },
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        let cli = Cli::parse();
        Logger::init(cli.verbose);

        match cli.command {
            Commands::Optimize {
                build_dir,
                meta_dir,
                exclude,
                no_minify_js,
                no_minify_html,
                no_minify_css,
                preload_modules,
                combined_css_name,
                concurrency,
                config,
            } => {
                // flags only ever turn defaults off (or preloading on)
                let overrides = CliOverrides {
                    minify_js: no_minify_js.then_some(false),
                    minify_html: no_minify_html.then_some(false),
                    minify_css: no_minify_css.then_some(false),
                    preload_modules: preload_modules.then_some(true),
                    combined_css_name,
                    exclude,
                    concurrency,
                };
                self.handle_optimize_command(build_dir, meta_dir, config, overrides)
                    .await
            }
            Commands::Scan { file } => self.handle_scan_command(file).await,
        }
    }

    async fn handle_optimize_command(
        &self,
        build_dir: PathBuf,
        meta_dir: PathBuf,
        config: Option<PathBuf>,
        overrides: CliOverrides,
    ) -> Result<()> {
        if !build_dir.is_dir() {
            return Err(OptimizeError::config(format!(
                "Build directory not found: {}",
                build_dir.display()
            )));
        }

        let project_root = build_dir
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_config = ConfigLoader::load(config.as_deref(), &project_root)?;
        let options = ConfigLoader::merge(file_config, overrides)?;

        let request = OptimizeRequest::new(build_dir)
            .with_meta_directory(meta_dir)
            .with_options(options);

        let report = OptimizeService::new(Arc::new(TokioFileSystemService))
            .optimize(&request)
            .await?;

        if let Some(css) = &report.combined_css {
            Logger::debug(&format!("Combined stylesheet: {}", css.display()));
        }
        Logger::debug(&report.to_string());
        Ok(())
    }

    async fn handle_scan_command(&self, file: PathBuf) -> Result<()> {
        let code = tokio::fs::read_to_string(&file).await?;
        let records = scan_imports(&code)?;

        tracing::info!("📦 {} static imports in {}", records.len(), file.display());
        for record in &records {
            tracing::info!(
                "  • {} [{}..{}] specifier [{}..{}]",
                record.specifier(&code),
                record.statement_start,
                record.statement_end,
                record.specifier_start,
                record.specifier_end
            );
        }
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
