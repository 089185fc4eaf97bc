//! Action primitives for the desktop agent
//!
//! This crate turns model-issued tool actions into host input:
//! - coordinate mapping between physical capture pixels and logical points
//! - the closed `Action` model and key-spec parser
//! - translation into scale-corrected input commands, plus log descriptions
//! - an executor that drives the input and clipboard ports with fixed settle timing

pub mod coords;
pub mod errors;
pub mod executor;
pub mod keys;
pub mod policy;
pub mod ports;
pub mod translate;
pub mod types;

pub use coords::*;
pub use errors::*;
pub use executor::{ActionExecutor, ActionReport, Outcome};
pub use keys::*;
pub use policy::TimingPolicy;
pub use ports::{ClipboardPort, InputPort};
pub use translate::{describe, translate, truncate};
pub use types::*;
