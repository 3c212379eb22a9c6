pub mod loader;
pub mod core;
