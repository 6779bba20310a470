mod archive;
mod builder;
mod control;
mod payload;

pub use archive::{CONTROL_MEMBER, DATA_MEMBER, DEBIAN_BINARY};
pub use builder::{BuildOptions, DebArtifact, build};
pub use payload::{Blacklist, FileContent, PayloadFile, collect_payload};
