pub mod integrity;
pub mod loader;
