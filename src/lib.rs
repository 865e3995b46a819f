//! Post-build optimization of a static site's output directory.
//!
//! Minifies emitted CSS, JS and HTML in place and replaces JavaScript imports
//! of CSS proxy modules with plain stylesheets, combined into one file that
//! every page links.

pub mod core;
pub mod infrastructure;
pub mod utils;

use crate::core::{OptimizeReport, OptimizeRequest, OptimizeService};
use crate::infrastructure::TokioFileSystemService;
use std::sync::Arc;

/// Optimize `request.build_directory` with the default file system and minifiers
pub async fn optimize(request: &OptimizeRequest) -> utils::Result<OptimizeReport> {
    OptimizeService::new(Arc::new(TokioFileSystemService))
        .optimize(request)
        .await
}
