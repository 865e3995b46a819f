use std::path::{Component, Path, PathBuf};

/// Remote modules are left to the browser
pub fn is_remote_module(specifier: &str) -> bool {
    specifier.starts_with("//")
        || specifier.starts_with("http://")
        || specifier.starts_with("https://")
}

/// Remove `\` and `/` from the beginning of a string
pub fn remove_leading_slash(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}

/// Lexically resolve `.` and `..` without touching the file system
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Resolve `specifier` against the directory containing `importer`
pub fn resolve_from(importer: &Path, specifier: &str) -> PathBuf {
    let dir = importer.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&dir.join(specifier))
}

/// Root-relative, forward-slash path with no leading slash
pub fn manifest_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Root-absolute URL (`/js/app.js`) for a file inside the build directory
pub fn root_url(root: &Path, path: &Path) -> String {
    format!("/{}", manifest_path(root, path))
}
