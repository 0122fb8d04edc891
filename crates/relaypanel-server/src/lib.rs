//! relaypanel server: HTTP control panel for a relay board, a door buzzer and
//! an Android TV.
//!
//! Startup order: parse flags, open the label database, seed the relay table,
//! connect the controllers, start the status reporter, then serve HTTP until
//! Ctrl-C.

pub mod app;
pub mod config;
pub mod http;
pub mod logging;
pub mod startup;
pub mod status;

pub use app::run;
pub use config::{CliAction, ConfigError, DeviceMode, ServerConfig};
