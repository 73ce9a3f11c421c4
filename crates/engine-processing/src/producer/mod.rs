pub mod encoder;
pub mod extractor;
