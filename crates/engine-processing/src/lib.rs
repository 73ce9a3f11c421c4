pub mod chunk;
pub mod consumer;
pub mod error;
pub mod producer;
pub mod recovery;
pub mod reporter;

#[cfg(test)]
pub(crate) mod fakes;
