mod deb_file;
mod host;

pub use deb_file::{resolve_output_path, write_deb_file};
pub use host::{bind_host, host_deb, serve_once};
