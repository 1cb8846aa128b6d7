//! Hospital registry integration
//!
//! [`RegistryClient::fetch_all_records`] walks the registry's pages through a
//! [`RegistrySource`] and parses each XML body with [`parser::parse_page`].

pub mod client;
pub mod parser;

pub use client::{HttpRegistrySource, RecordSet, RegistryClient, RegistrySource};
pub use parser::{extract, parse_page};
