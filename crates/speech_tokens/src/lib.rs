pub mod audio;
pub mod config;
pub mod extraction;
#[cfg(feature = "wav")]
pub mod io;
pub mod prelude;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
