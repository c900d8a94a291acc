//! Vectra resource API clients

pub mod hosts;

pub use hosts::{FetchOptions, HostsClient};
