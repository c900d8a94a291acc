//! # Vectra Infra
//!
//! I/O adapters for the Vectra exporter:
//! - `config`: credential loading from env files
//! - `http`: authenticated HTTP transport
//! - `api`: paginated host retrieval engine
//! - `export`: CSV projection and writing

pub mod api;
pub mod config;
pub mod export;
pub mod http;
