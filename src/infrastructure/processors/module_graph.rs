use crate::core::models::ProxyNaming;
use crate::infrastructure::processors::import_scanner::scan_dependencies;
use crate::utils::{is_remote_module, normalize_path, remove_leading_slash, resolve_from, Logger};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Static import edges between the JS files of one build directory.
///
/// Built from the sources as they were before any file is rewritten.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    root: PathBuf,
    edges: HashMap<PathBuf, Vec<PathBuf>>,
}

impl ModuleGraph {
    pub fn build(root: &Path, js_files: &[PathBuf], naming: &ProxyNaming) -> Self {
        let known: HashSet<&PathBuf> = js_files.iter().collect();
        let mut edges = HashMap::with_capacity(js_files.len());

        for file in js_files {
            let code = match std::fs::read_to_string(file) {
                Ok(code) => code,
                Err(e) => {
                    Logger::debug(&format!("Module graph: cannot read {}: {}", file.display(), e));
                    continue;
                }
            };
            let records = match scan_dependencies(&code) {
                Ok(records) => records,
                Err(e) => {
                    Logger::debug(&format!("Module graph: cannot scan {}: {}", file.display(), e));
                    continue;
                }
            };

            let deps = records
                .iter()
                .map(|record| record.specifier(&code))
                .filter(|specifier| !naming.is_css_proxy(specifier))
                .filter_map(|specifier| resolve_local(root, file, specifier))
                .filter(|dep| known.contains(dep))
                .collect();
            edges.insert(file.clone(), deps);
        }

        Self {
            root: root.to_path_buf(),
            edges,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every module reachable from `entries`, in discovery order, entries excluded
    pub fn preload_list(&self, entries: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen: HashSet<&Path> = entries.iter().map(PathBuf::as_path).collect();
        let mut order = Vec::new();
        let mut stack: Vec<&PathBuf> = entries.iter().rev().collect();

        while let Some(current) = stack.pop() {
            let Some(deps) = self.edges.get(current) else {
                continue;
            };
            let mut discovered = Vec::new();
            for dep in deps {
                if seen.insert(dep.as_path()) {
                    order.push(dep.clone());
                    discovered.push(dep);
                }
            }
            // first import is visited first
            stack.extend(discovered.into_iter().rev());
        }

        order
    }
}

/// Resolve a relative or root-absolute specifier; bare and remote ones are not ours
pub fn resolve_local(root: &Path, importer: &Path, specifier: &str) -> Option<PathBuf> {
    let specifier = specifier.split(['?', '#']).next().unwrap_or(specifier);
    if is_remote_module(specifier) {
        return None;
    }
    if specifier.starts_with('/') {
        return Some(normalize_path(&root.join(remove_leading_slash(specifier))));
    }
    if specifier.starts_with("./") || specifier.starts_with("../") {
        return Some(resolve_from(importer, specifier));
    }
    None
}
