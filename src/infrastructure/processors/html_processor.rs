use crate::infrastructure::processors::module_graph::{resolve_local, ModuleGraph};
use crate::utils::{is_remote_module, root_url};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static HEAD_CLOSE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

static HEAD_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").unwrap());

static MODULE_SCRIPT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script\b[^>]*\btype\s*=\s*["']?module["']?[^>]*>"#).unwrap()
});

static SRC_ATTR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());

pub fn stylesheet_link(href: &str) -> String {
    format!("    <link rel=\"stylesheet\" href=\"{}\" />\n", href)
}

pub fn modulepreload_link(href: &str) -> String {
    format!("    <link rel=\"modulepreload\" href=\"{}\" />\n", href)
}

/// Insert `snippet` at the end of `<head>`.
///
/// Without `</head>` it goes right after the opening tag, and without any head
/// at the very start of the document.
pub fn inject_into_head(html: &str, snippet: &str) -> String {
    let at = if let Some(close) = HEAD_CLOSE_REGEX.find(html) {
        close.start()
    } else if let Some(open) = HEAD_OPEN_REGEX.find(html) {
        open.end()
    } else {
        0
    };

    let mut output = String::with_capacity(html.len() + snippet.len());
    output.push_str(&html[..at]);
    output.push_str(snippet);
    output.push_str(&html[at..]);
    output
}

/// Local files referenced by `<script type="module" src=...>`
pub fn module_script_entries(html: &str, html_file: &Path, root: &Path) -> Vec<PathBuf> {
    MODULE_SCRIPT_REGEX
        .find_iter(html)
        .filter_map(|tag| SRC_ATTR_REGEX.captures(tag.as_str()))
        .filter_map(|c| c.get(1))
        .filter_map(|src| {
            let src = src.as_str();
            if is_remote_module(src) {
                return None;
            }
            // bare `app.js` in HTML is relative to the document
            if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
                resolve_local(root, html_file, src)
            } else {
                resolve_local(root, html_file, &format!("./{}", src))
            }
        })
        .collect()
}

/// Add `<link rel="modulepreload">` hints for every module the page's scripts import
pub fn preload_modules(html: &str, html_file: &Path, graph: &ModuleGraph) -> String {
    let entries = module_script_entries(html, html_file, graph.root());
    let modules = graph.preload_list(&entries);
    if modules.is_empty() {
        return html.to_string();
    }

    let links: String = modules
        .iter()
        .map(|module| modulepreload_link(&root_url(graph.root(), module)))
        .collect();
    inject_into_head(html, &links)
}
