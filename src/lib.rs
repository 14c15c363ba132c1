pub mod abi_loader;
pub mod account;
pub mod basic_elements;
pub mod builder;
pub mod client;
pub mod config;
pub mod constants;
pub mod contract;
pub mod error;
pub mod helpers;
pub mod invoker;
pub mod metadata;
pub mod orchestrator;
pub mod submitter;
pub mod types;

pub use error::{Error, Result};
