use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const TAG: &str = "[optimize]";

pub struct Logger;

impl Logger {
    /// Install the global subscriber. `RUST_LOG` wins over `verbose`.
    pub fn init(verbose: bool) {
        let default = if verbose {
            "css_inline_optimizer=debug"
        } else {
            "css_inline_optimizer=info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        // A second init (tests, embedding hosts) is not an error
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }

    pub fn optimize_start(build_dir: &Path, concurrency: usize) {
        info!("🔧 {} Optimizing {}", TAG, build_dir.display());
        debug!("⚙️  Worker concurrency: {}", concurrency);
    }

    pub fn found_files(total: usize, js_count: usize) {
        info!("📁 Found {} files ({} JS modules)", total, js_count);
    }

    pub fn preload_css(enabled: bool) {
        if enabled {
            info!("🎨 CSS imports detected - embedding and combining styles");
        } else {
            debug!("⚡ No CSS imports found - skipping CSS embedding");
        }
    }

    pub fn processing_file(path: &Path, kind: &str) {
        debug!("⚡ Processing: {} ({})", path.display(), kind);
    }

    pub fn file_failed(path: &Path, message: &str) {
        error!("{} Error: {} {}", TAG, path.display(), message);
    }

    pub fn combined_css_written(path: &Path, bytes: usize) {
        info!("📦 Combined CSS written: {} ({} bytes)", path.display(), bytes);
    }

    pub fn removed_files(count: usize) {
        debug!("🗑️  Removed {} embedded CSS files", count);
    }

    pub fn manifest_written(path: &Path) {
        debug!("📝 Manifest written: {}", path.display());
    }

    pub fn summary(processed: usize, failed: usize, elapsed: std::time::Duration) {
        info!("");
        info!("📊 Optimization Statistics:");
        info!("  • Files optimized: {}", processed);
        info!("  • Files failed: {}", failed);
        info!("  • Time: {:.2?}", elapsed);
        if failed == 0 {
            info!("✅ Optimization completed successfully!");
        } else {
            warn!("⚠️  Optimization completed with {} failures", failed);
        }
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn error(msg: &str) {
        error!("❌ {}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
