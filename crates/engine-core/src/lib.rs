pub mod connectors;
pub mod context;
pub mod error;
pub mod log;
pub mod metrics;
pub mod resolver;
pub mod state;
