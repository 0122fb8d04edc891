//! Android TV remote control over ADB.
//!
//! Each button press runs two `adb` invocations: `adb connect host:port`
//! (a no-op when already connected) followed by
//! `adb -s host:port shell input keyevent <code>`. Both are bounded by
//! [`AdbConfig::timeout`].
//!
//! ```no_run
//! use relaypanel_tv::{AdbClient, AdbConfig, TvCommand};
//!
//! # async fn run() -> relaypanel_tv::Result<()> {
//! let client = AdbClient::new(AdbConfig::from_target("192.168.1.11:36275")?);
//! client.send("volume_up".parse::<TvCommand>()?).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod keys;

pub use client::{AdbClient, AdbConfig, DEFAULT_ADB_HOST, DEFAULT_ADB_PORT, DEFAULT_ADB_TIMEOUT};
pub use error::{Result, TvError};
pub use keys::{KeyCode, TvCommand};
