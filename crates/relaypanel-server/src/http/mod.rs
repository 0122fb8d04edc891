//! HTTP API.
//!
//! | method | path | |
//! |--------|------|-|
//! | GET | `/status` | devices and relays |
//! | GET | `/relay/states` | relay table |
//! | GET | `/relay/{id}` | toggle, then relay table |
//! | POST | `/relay/setLabel/{id}` | `{"label": "..."}` |
//! | GET | `/door/buzz` | pulse the buzzer |
//! | GET | `/tv/{command}` | remote button |
//!
//! Every path also answers with a trailing slash. Anything else is looked up
//! in the static directory.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod static_files;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{MethodRouter, get, post};
use relaypanel_hardware::DeviceManager;
use relaypanel_storage::SqliteLabelStore;
use relaypanel_tv::AdbClient;

pub use error::ApiError;

/// Shared handler state.
#[derive(Debug)]
pub struct AppState {
    pub devices: DeviceManager,
    pub labels: SqliteLabelStore,
    /// `None` answers every TV route with 503.
    pub tv: Option<AdbClient>,
    pub static_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    let routes: Vec<(&str, MethodRouter<SharedState>)> = vec![
        ("/status", get(routes::status)),
        ("/relay/states", get(routes::relay_states)),
        ("/relay/{id}", get(routes::toggle_relay)),
        ("/relay/setLabel/{id}", post(routes::set_label)),
        ("/door/buzz", get(routes::buzz_door)),
        ("/tv/{command}", get(routes::tv_command)),
    ];

    routes
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| {
            router
                .route(path, handler.clone())
                .route(&format!("{path}/"), handler)
        })
        .fallback(static_files::serve_static)
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}
