use css_inline_optimizer::core::{OptimizeOptions, OptimizeRequest};
use std::path::Path;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap()
}

fn request(root: &Path, options: OptimizeOptions) -> OptimizeRequest {
    OptimizeRequest::new(root).with_options(options)
}

#[tokio::test]
async fn test_css_imports_are_combined_and_removed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "index.html", "<html><head><title>t</title></head><body></body></html>");
    write(root, "js/app.js", "import '../css/global.css.proxy.js';\nimport url from './theme.css.proxy.js';\nconsole.log(url);\n");
    write(root, "js/other.js", "import '../css/global.css.proxy.js';\nexport const o = 1;\n");
    write(root, "js/theme.css", ".theme { color: blue; }");
    write(root, "js/theme.css.proxy.js", "export default './theme.css';");
    write(root, "css/global.css", "body { margin: 0; }");
    write(root, "css/global.css.proxy.js", "const style = document.createElement('style');");

    let options = OptimizeOptions {
        minify_js: false,
        minify_html: false,
        ..Default::default()
    };
    let report = css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    assert!(report.preload_css);
    assert!(report.failures.is_empty());
    assert_eq!(report.removed_files, 4);

    assert_eq!(read(root, "js/app.js"), "const url = './theme.css';\nconsole.log(url);\n");
    assert_eq!(read(root, "js/other.js"), "export const o = 1;\n");
    assert!(!root.join("css/global.css").exists());
    assert!(!root.join("css/global.css.proxy.js").exists());
    assert!(!root.join("js/theme.css.proxy.js").exists());

    let combined = read(root, "imported-styles.css");
    assert_eq!(combined.matches("body").count(), 1);
    assert!(combined.contains(".theme"));
    assert!(combined.find("body").unwrap() < combined.find(".theme").unwrap());

    assert!(read(root, "index.html")
        .contains("<link rel=\"stylesheet\" href=\"/imported-styles.css\" />"));
}

#[tokio::test]
async fn test_css_module_named_import() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "app.js", "import {btn} from './x.module.css.proxy.js';\nconsole.log(btn);\n");
    write(root, "x.module.css", ".btn_a1b2 { color: red; }");
    write(root, "x.module.css.proxy.js", "let json = {\"btn\":\"btn_a1b2\"};\nexport default json;\n");

    let options = OptimizeOptions {
        minify_js: false,
        ..Default::default()
    };
    css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    assert_eq!(
        read(root, "app.js"),
        "const {btn} = {\"btn\":\"btn_a1b2\"};\nconsole.log(btn);\n"
    );
    assert!(read(root, "imported-styles.css").contains(".btn_a1b2"));
}

#[tokio::test]
async fn test_no_css_imports_skips_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let html = "<html><head></head><body></body></html>";
    write(root, "index.html", html);
    write(root, "app.js", "import('./lazy.css.proxy.js');\n");
    write(root, "lazy.css.proxy.js", "export default 1;\n");

    let options = OptimizeOptions {
        minify_js: false,
        minify_html: false,
        ..Default::default()
    };
    let report = css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    assert!(!report.preload_css);
    assert!(report.combined_css.is_none());
    assert!(!root.join("imported-styles.css").exists());
    assert!(root.join("lazy.css.proxy.js").exists());
    assert_eq!(read(root, "index.html"), html);
}

#[tokio::test]
async fn test_failed_file_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "a.js", "export const a = 1;\n");
    write(root, "broken.js", "export const = ;\n");
    write(root, "c.css", "a { color: red; }");

    let report = css_inline_optimizer::optimize(&request(root, OptimizeOptions::default()))
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, root.join("broken.js"));
    assert_eq!(report.files_processed, 2);
    assert_eq!(read(root, "broken.js"), "export const = ;\n");
    assert_eq!(read(root, "c.css"), "a{color:red}");

    let manifest: serde_json::Value =
        serde_json::from_str(&read(root, "_snowpack/optimize-manifest.json")).unwrap();
    let imports = manifest["imports"].as_object().unwrap();
    assert!(imports.contains_key("a.js"));
    assert!(imports.contains_key("c.css"));
    assert!(!imports.contains_key("broken.js"));
}

#[tokio::test]
async fn test_excluded_files_are_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "vendor/lib.css", "a { color : red ; }");
    write(root, "_snowpack/env.js", "export const MODE = 'production';\n");
    write(root, "site.css", "a { color : red ; }");

    let options = OptimizeOptions {
        exclude: vec!["vendor/**".to_string()],
        ..Default::default()
    };
    css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    assert_eq!(read(root, "vendor/lib.css"), "a { color : red ; }");
    assert_eq!(read(root, "_snowpack/env.js"), "export const MODE = 'production';\n");
    assert_eq!(read(root, "site.css"), "a{color:red}");
}

#[tokio::test]
async fn test_module_preload_hints() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "index.html",
        "<html><head></head><body><script type=\"module\" src=\"/js/app.js\"></script></body></html>",
    );
    write(root, "js/app.js", "import { dep } from './dep.js';\nconsole.log(dep);\n");
    write(root, "js/dep.js", "import '/web_modules/lib.js';\nexport const dep = 1;\n");
    write(root, "web_modules/lib.js", "export default 1;\n");

    let options = OptimizeOptions {
        minify_js: false,
        minify_html: false,
        preload_modules: true,
        ..Default::default()
    };
    css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    let html = read(root, "index.html");
    let dep = html.find("href=\"/js/dep.js\"").unwrap();
    let lib = html.find("href=\"/web_modules/lib.js\"").unwrap();
    assert!(dep < lib);
    assert!(!html.contains("stylesheet"));
}

#[tokio::test]
async fn test_unparsable_js_does_not_enable_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let html = "<html><head></head><body></body></html>";
    write(root, "index.html", html);
    write(root, "app.js", "export const a = 1;\n");
    write(root, "broken.js", "export const = ;\n");

    let options = OptimizeOptions {
        minify_js: false,
        minify_html: false,
        ..Default::default()
    };
    let report = css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    assert!(!report.preload_css);
    assert!(report.combined_css.is_none());
    assert_eq!(read(root, "index.html"), html);
    assert!(!root.join("imported-styles.css").exists());
}

#[tokio::test]
async fn test_rejected_stylesheet_still_combines() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "app.js", "import './a.css.proxy.js';\nexport const a = 1;\n");
    write(root, "a.css", "@media screen and ( {\n  .a { color: red; }\n}\n");
    write(root, "a.css.proxy.js", "export {};\n");

    let options = OptimizeOptions {
        minify_js: false,
        ..Default::default()
    };
    let report = css_inline_optimizer::optimize(&request(root, options)).await.unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(read(root, "app.js"), "export const a = 1;\n");
    assert!(read(root, "imported-styles.css").contains(".a { color: red; }"));
    assert!(!root.join("a.css").exists());
    assert!(!root.join("a.css.proxy.js").exists());
    assert!(root.join("_snowpack/optimize-manifest.json").exists());
}

#[tokio::test]
async fn test_unembedded_proxies_are_minified() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let lazy = "export default   'lazy' ;\n";
    write(root, "app.js", "import './a.css.proxy.js';\nimport('./lazy.css.proxy.js');\n");
    write(root, "a.css", ".a { color: red; }");
    write(root, "a.css.proxy.js", "export {};\n");
    write(root, "lazy.css", ".lazy { color: blue; }");
    write(root, "lazy.css.proxy.js", lazy);

    let report = css_inline_optimizer::optimize(&request(root, OptimizeOptions::default()))
        .await
        .unwrap();

    assert!(report.failures.is_empty());
    assert!(!root.join("a.css.proxy.js").exists());
    let minified = read(root, "lazy.css.proxy.js");
    assert_ne!(minified, lazy);
    assert!(minified.contains("lazy"));
}
