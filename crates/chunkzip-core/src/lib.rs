pub mod config;
pub mod logging;

pub mod assembler;
pub mod checksum;
pub mod error;
pub mod fetch;
pub mod model;
pub mod orchestrator;
pub mod planner;
pub mod processor;
pub mod slug;
pub mod store;
pub mod walker;
pub mod worker;

pub use error::WorkerError;
