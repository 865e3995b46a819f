// Core domain layer
pub mod interfaces;
pub mod models;
pub mod optimizer;
pub mod services;

pub use interfaces::*;
pub use models::*;
pub use optimizer::*;
pub use services::*;
