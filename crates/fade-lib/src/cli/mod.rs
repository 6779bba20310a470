mod args;
mod create_deb;
mod edit;
mod init;
mod params;
mod resolved_command;

pub use args::{Args, Command, DEFAULT_BIND_ADDRESS, ProjectOptions, parse_args, try_parse_command};
pub use create_deb::run_create_deb;
pub use edit::run_edit;
pub use init::run_init;
pub use params::{CreateDebParams, DebSink, EditParams, InitParams};
pub use resolved_command::{ResolvedCommand, resolve_command};
