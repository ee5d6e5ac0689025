//! `taxmerge-engine` — multi-pass taxon entity-resolution engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns merged records
//! plus per-pass statistics. No file IO or CLI dependencies.

pub mod binomial;
pub mod cascade;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod summary;
pub mod synonym;

pub use config::MergeConfig;
pub use error::MergeError;
pub use model::{MergeInput, MergeResult, MergedRecord};
pub use pipeline::run;
