pub mod chunk;
pub mod mode;
