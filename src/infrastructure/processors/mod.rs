// Processors module
pub mod css_embedder;
pub mod css_processor;
pub mod html_processor;
pub mod import_scanner;
pub mod minifier;
pub mod module_graph;

pub use css_embedder::*;
pub use css_processor::*;
pub use html_processor::*;
pub use import_scanner::*;
pub use minifier::*;
pub use module_graph::*;
