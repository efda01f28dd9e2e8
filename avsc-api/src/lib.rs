//! avsc-api - the AviSynth+ C API surface
//!
//! This crate describes what a plugin can call in the host without linking
//! against an import library: the ABI types the host passes around, the
//! interface version pair, and a function table with one slot per exported
//! entry point. Resolving the table against a live host library is the job of
//! `avsc-loader`.
//!
//! # Example
//!
//! ```
//! use avsc_api::{ApiTable, SymbolDescriptor};
//!
//! let table = ApiTable::new();
//! assert!(table.avs_get_frame().is_none());
//! assert!(SymbolDescriptor::find("avs_get_frame").is_some());
//! ```

pub mod symbols;
pub mod table;
pub mod types;
pub mod version;

pub use symbols::{ApiTable, SYMBOLS};
pub use table::{BOOTSTRAP_SYMBOLS, PROPERTY_QUERY_SYMBOL, SymbolAddress, SymbolDescriptor};
pub use types::*;
pub use version::{INTERFACE_BUGFIX_VERSION, INTERFACE_VERSION, InterfaceVersion};
