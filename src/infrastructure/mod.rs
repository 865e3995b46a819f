// Infrastructure layer
pub mod file_system;
pub mod manifest;
pub mod processors;

pub use file_system::*;
pub use manifest::*;
pub use processors::*;
