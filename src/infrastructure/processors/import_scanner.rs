use crate::core::models::{ImportRecord, ProxyNaming};
use crate::utils::{Logger, OptimizeError, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use std::path::PathBuf;

/// Report every static `import` statement of an ES module, in source order.
///
/// Only top-level import declarations are reported. `import()` calls and
/// `import.meta` are expressions and never appear here. Sources the parser
/// cannot read are an error.
pub fn scan_imports(source: &str) -> Result<Vec<ImportRecord>> {
    scan(source, false)
}

/// Like [`scan_imports`], plus `export ... from` and `export * from` re-exports.
///
/// These are the edges a browser follows when loading the module.
pub fn scan_dependencies(source: &str) -> Result<Vec<ImportRecord>> {
    scan(source, true)
}

fn scan(source: &str, include_reexports: bool) -> Result<Vec<ImportRecord>> {
    let allocator = Allocator::default();
    let parse_result = Parser::new(&allocator, source, SourceType::mjs()).parse();

    if parse_result.panicked || !parse_result.errors.is_empty() {
        let errors: Vec<String> = parse_result
            .errors
            .iter()
            .map(|e| format!("Parse error: {}", e))
            .collect();
        return Err(OptimizeError::parse(errors.join("\n")));
    }

    let records = parse_result
        .program
        .body
        .iter()
        .filter_map(|statement| match statement {
            Statement::ImportDeclaration(decl) => Some(record(decl.span, decl.source.span)),
            Statement::ExportAllDeclaration(decl) if include_reexports => {
                Some(record(decl.span, decl.source.span))
            }
            Statement::ExportNamedDeclaration(decl) if include_reexports => decl
                .source
                .as_ref()
                .map(|source| record(decl.span, source.span)),
            _ => None,
        })
        .collect();

    Ok(records)
}

fn record(statement: Span, literal: Span) -> ImportRecord {
    ImportRecord {
        statement_start: statement.start as usize,
        statement_end: statement.end as usize,
        // string literal spans include their quotes
        specifier_start: literal.start as usize + 1,
        specifier_end: literal.end as usize - 1,
    }
}

/// Early-exit check: does any of `files` statically import a CSS proxy?
///
/// Files are read and scanned in order; the first hit stops the walk, so
/// later files are never opened. A file that does not parse counts as having
/// no CSS import; it fails again when it is optimized.
pub fn has_css_import(files: &[PathBuf], naming: &ProxyNaming) -> Result<bool> {
    for file in files {
        let code = std::fs::read_to_string(file)?;
        let imports = match scan_imports(&code) {
            Ok(imports) => imports,
            Err(e) => {
                Logger::debug(&format!("CSS import check skipped {}: {}", file.display(), e));
                continue;
            }
        };
        if imports
            .iter()
            .any(|record| naming.is_css_proxy(record.specifier(&code)))
        {
            return Ok(true);
        }
    }
    Ok(false)
}
