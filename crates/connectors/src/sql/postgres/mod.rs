pub mod adapter;
pub mod encoder;
pub mod ledger;
pub mod session;
pub(crate) mod utils;
