pub mod provider;
pub mod sink;
pub mod source;
