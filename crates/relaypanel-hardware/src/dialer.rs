//! Connection factories.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::Result;
use crate::connection::Connection;

/// Future returned by a dialer.
pub type DialFuture = BoxFuture<'static, Result<Connection>>;

/// A zero-argument function producing a fresh connection.
///
/// Installed once per device and shared by the startup path and the reconnect
/// loop. Cloning is cheap.
///
/// # Examples
///
/// ```
/// use relaypanel_hardware::{Connection, Dialer};
///
/// let dialer = Dialer::new(|| async {
///     let (local, _remote) = tokio::io::duplex(64);
///     Ok(Connection::from_stream("loopback", local))
/// });
/// # let _ = dialer;
/// ```
#[derive(Clone)]
pub struct Dialer {
    dial: Arc<dyn Fn() -> DialFuture + Send + Sync>,
}

impl Dialer {
    pub fn new<F, Fut>(dial: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Connection>> + Send + 'static,
    {
        Self {
            dial: Arc::new(move || dial().boxed()),
        }
    }

    /// Attempt one connection.
    pub async fn dial(&self) -> Result<Connection> {
        (self.dial)().await
    }
}

impl fmt::Debug for Dialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialer").finish_non_exhaustive()
    }
}
