//! Proxim Core - Domain models, configuration, and ports
//!
//! This crate contains the canonical record types and port definitions for
//! the proxim enrichment engine. All geometry computation lives in
//! `proxim-geo`; the loaders and geocoder behind the ports live in
//! `proxim-cli` (or any other host shell).

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{ProximError, Result};
