pub mod cli;
pub mod config;
pub mod deb;
pub mod error;
pub mod launcher;
pub mod merge;
pub mod output;
pub mod payload;
pub mod project;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{PartialProjectConfig, ProjectConfig, ProjectType};
pub use error::FadeError;
