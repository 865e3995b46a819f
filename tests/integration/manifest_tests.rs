use css_inline_optimizer::core::{Manifest, OptimizeOptions, OptimizeRequest};
use std::path::Path;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn load_manifest(request: &OptimizeRequest) -> Manifest {
    let json = std::fs::read_to_string(request.manifest_path()).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[tokio::test]
async fn test_manifest_shape() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "z/app.js", "import '../a.css.proxy.js';\n");
    write(root, "b.js", "import './a.css.proxy.js';\n");
    write(root, "a.css", "a { color: red; }");
    write(root, "a.css.proxy.js", "export {};\n");
    write(root, "logo.png", "png");

    let request = OptimizeRequest::new(root)
        .with_meta_directory("__meta__")
        .with_options(OptimizeOptions {
            combined_css_name: "/css/all.css".to_string(),
            ..Default::default()
        });
    css_inline_optimizer::optimize(&request).await.unwrap();

    let manifest = load_manifest(&request);
    let keys: Vec<&str> = manifest.imports.keys().map(String::as_str).collect();
    // consumed files were scanned too; they appear with no contribution
    assert_eq!(keys, vec!["a.css", "a.css.proxy.js", "b.js", "logo.png", "z/app.js"]);

    let css = &manifest.imports["z/app.js"].css;
    assert_eq!(css.len(), 1);
    assert_eq!(css[0].actual, "a.css");
    assert_eq!(css[0].proxy, "a.css.proxy.js");
    assert!(manifest.imports["logo.png"].css.is_empty());
    assert_eq!(manifest.generated, vec!["css/all.css".to_string()]);
    assert!(root.join("css/all.css").exists());
}

#[tokio::test]
async fn test_manifest_is_identical_across_runs() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for root in [first.path(), second.path()] {
        for i in 0..20 {
            write(root, &format!("js/m{:02}.js", i), &format!("import './s{}.css.proxy.js';\n", i % 3));
        }
        for i in 0..3 {
            write(root, &format!("js/s{}.css", i), &format!(".s{} {{ color: red; }}", i));
            write(root, &format!("js/s{}.css.proxy.js", i), "export {};\n");
        }
    }

    let options = OptimizeOptions {
        concurrency: 1,
        ..Default::default()
    };
    let sequential = OptimizeRequest::new(first.path()).with_options(options);
    let options = OptimizeOptions {
        concurrency: 8,
        ..Default::default()
    };
    let parallel = OptimizeRequest::new(second.path()).with_options(options);

    css_inline_optimizer::optimize(&sequential).await.unwrap();
    css_inline_optimizer::optimize(&parallel).await.unwrap();

    let a = std::fs::read_to_string(sequential.manifest_path()).unwrap();
    let b = std::fs::read_to_string(parallel.manifest_path()).unwrap();
    assert_eq!(a, b);

    let css_a = std::fs::read_to_string(sequential.combined_css_path()).unwrap();
    let css_b = std::fs::read_to_string(parallel.combined_css_path()).unwrap();
    assert_eq!(css_a, css_b);
}
