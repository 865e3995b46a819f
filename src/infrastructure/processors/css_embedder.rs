//! Replaces static imports of CSS proxies in built JavaScript.
//!
//! ```text
//! import './global.css.proxy.js'                       -> (removed; loaded from HTML)
//! import url from './global.css.proxy.js'              -> const url = './global.css';
//! import {foo, bar} from './local.module.css.proxy.js' -> const {foo, bar} = {"foo":"..."};
//! ```
//!
//! Edits are anchored to the spans reported by the import scanner and applied
//! left to right over the untouched original, so everything outside the
//! rewritten statements stays byte-identical.

use crate::core::models::{CssImportEntry, EmbeddedCss, ImportRecord, ProxyNaming};
use crate::infrastructure::processors::import_scanner::scan_imports;
use crate::utils::{resolve_from, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::path::Path;

static CLASS_MAP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^let json\s*=\s*(\{[^}]+\})").unwrap());

static NAMESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\s+as\s+").unwrap());

struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// Rewrite every static CSS-proxy import of `file`, whose source is `code`.
pub fn embed_static_css(file: &Path, code: &str, naming: &ProxyNaming) -> Result<EmbeddedCss> {
    let mut imports = Vec::new();
    let mut edits = Vec::new();

    for record in scan_imports(code)? {
        let specifier = record.specifier(code);
        if !naming.is_css_proxy(specifier) {
            continue;
        }

        let actual_specifier = naming.actual_specifier(specifier);
        let entry = CssImportEntry {
            actual: resolve_from(file, actual_specifier),
            proxy: resolve_from(file, specifier),
        };
        let bindings = bound_names(code, &record);

        let edit = if bindings.is_empty() {
            Edit {
                range: record.statement_start..statement_end(code, &record, true),
                replacement: String::new(),
            }
        } else if naming.is_css_module(actual_specifier) {
            let Some(class_map) = read_class_map(&entry.proxy)? else {
                // no mapping in the proxy: keep the import and its files
                continue;
            };
            Edit {
                range: record.statement_start..statement_end(code, &record, false),
                replacement: format!("const {} = {};", bindings, class_map),
            }
        } else {
            Edit {
                range: record.statement_start..statement_end(code, &record, false),
                replacement: format!("const {} = '{}';", bindings, actual_specifier),
            }
        };

        edits.push(edit);
        imports.push(entry);
    }

    Ok(EmbeddedCss {
        imports,
        code: apply_edits(code, &edits),
    })
}

/// Everything between `import` and `from`, with `* as X` collapsed to `X`
fn bound_names(code: &str, record: &ImportRecord) -> String {
    // the byte before the specifier is its opening quote
    let clause = &code[record.statement_start..record.specifier_start.saturating_sub(1)];
    let clause = clause.strip_prefix("import").unwrap_or(clause).trim();
    let clause = clause.strip_suffix("from").unwrap_or(clause).trim();
    NAMESPACE_REGEX.replace_all(clause, "").into_owned()
}

/// Extend a statement over a trailing `;` and, for removals, one line break
fn statement_end(code: &str, record: &ImportRecord, eat_newline: bool) -> usize {
    let mut end = record.statement_end;
    let rest = &code[end..];
    if rest.starts_with(';') {
        end += 1;
    }
    if eat_newline {
        let rest = &code[end..];
        if rest.starts_with("\r\n") {
            end += 2;
        } else if rest.starts_with('\n') {
            end += 1;
        }
    }
    end
}

/// The `let json = {...}` class-name mapping of a CSS-module proxy, if any
fn read_class_map(proxy: &Path) -> Result<Option<String>> {
    let proxy_code = match std::fs::read_to_string(proxy) {
        Ok(code) => code,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(CLASS_MAP_REGEX
        .captures(&proxy_code)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string()))
}

fn apply_edits(code: &str, edits: &[Edit]) -> String {
    let mut output = String::with_capacity(code.len());
    let mut cursor = 0;
    for edit in edits {
        output.push_str(&code[cursor..edit.range.start]);
        output.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    output.push_str(&code[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn embed(file: &Path, code: &str) -> EmbeddedCss {
        embed_static_css(file, code, &ProxyNaming::default()).unwrap()
    }

    #[test]
    fn test_no_css_imports_is_unchanged() {
        let code = "import a from './a.js';\nimport('./lazy.css.proxy.js');\nconsole.log(a);\n";
        let result = embed(Path::new("/build/app.js"), code);

        assert_eq!(result.code, code);
        assert!(result.imports.is_empty());
    }

    #[test]
    fn test_side_effect_import_is_removed_with_its_line() {
        let code = "import './a.css.proxy.js';\nconsole.log(1);\n";
        let result = embed(Path::new("/build/js/app.js"), code);

        assert_eq!(result.code, "console.log(1);\n");
        assert_eq!(
            result.imports,
            vec![CssImportEntry {
                actual: PathBuf::from("/build/js/a.css"),
                proxy: PathBuf::from("/build/js/a.css.proxy.js"),
            }]
        );
    }

    #[test]
    fn test_default_import_becomes_url() {
        let code = "import url from './a.css.proxy.js';\nconsole.log(url);\n";
        let result = embed(Path::new("/build/app.js"), code);

        assert_eq!(result.code, "const url = './a.css';\nconsole.log(url);\n");
        assert_eq!(result.imports.len(), 1);
    }

    #[test]
    fn test_namespace_import_is_collapsed() {
        let code = "import * as sheet from '../css/a.css.proxy.js';\n";
        let result = embed(Path::new("/build/js/app.js"), code);

        assert_eq!(result.code, "const sheet = '../css/a.css';\n");
        assert_eq!(result.imports[0].actual, PathBuf::from("/build/css/a.css"));
    }

    #[test]
    fn test_css_module_namespace_import_binds_class_map() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("x.module.css.proxy.js"),
            "let json = {\"btn\":\"btn_a1b2\"};\nexport default json;\n",
        )
        .unwrap();

        let file = dir.path().join("app.js");
        let code = "import * as styles from './x.module.css.proxy.js';\nconsole.log(styles.btn);\n";
        let result = embed(&file, code);

        assert_eq!(
            result.code,
            "const styles = {\"btn\":\"btn_a1b2\"};\nconsole.log(styles.btn);\n"
        );
        assert_eq!(result.imports[0].proxy, dir.path().join("x.module.css.proxy.js"));
    }

    #[test]
    fn test_css_module_named_import_uses_class_map() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("x.module.css.proxy.js"),
            "let json = {\"btn\":\"btn_a1b2\"};\nexport default json;\n",
        )
        .unwrap();

        let file = dir.path().join("app.js");
        let code = "import {btn} from './x.module.css.proxy.js';\nconsole.log(btn);\n";
        let result = embed(&file, code);

        assert_eq!(
            result.code,
            "const {btn} = {\"btn\":\"btn_a1b2\"};\nconsole.log(btn);\n"
        );
        assert_eq!(result.imports[0].actual, dir.path().join("x.module.css"));
    }

    #[test]
    fn test_css_module_without_class_map_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("x.module.css.proxy.js"),
            "export default {};\n",
        )
        .unwrap();

        let file = dir.path().join("app.js");
        let code = "import styles from './x.module.css.proxy.js';\nimport './a.css.proxy.js';\n";
        let result = embed(&file, code);

        assert_eq!(result.code, "import styles from './x.module.css.proxy.js';\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].actual, dir.path().join("a.css"));
    }

    #[test]
    fn test_every_import_is_rewritten_once() {
        let code = "import a from './a.css.proxy.js';\nimport b from './a.css.proxy.js';\nconst s = \"import a from './a.css.proxy.js';\";\n";
        let result = embed(Path::new("/build/app.js"), code);

        assert_eq!(
            result.code,
            "const a = './a.css';\nconst b = './a.css';\nconst s = \"import a from './a.css.proxy.js';\";\n"
        );
        assert_eq!(result.imports.len(), 2);
    }

    #[test]
    fn test_surrounding_code_is_untouched() {
        let code = "// header\nimport x from './x.js';\nimport './a.css.proxy.js'\nexport default x;";
        let result = embed(Path::new("/build/app.js"), code);

        assert_eq!(result.code, "// header\nimport x from './x.js';\nexport default x;");
    }
}
