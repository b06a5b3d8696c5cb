//! passkeep-core - Shared functionality for the passkeep tools
//!
//! Where things live on disk and how the user configures them.

pub mod config;
pub mod paths;

pub use config::{Config, GeneratorConfig};
pub use paths::Paths;
