//! Route table of the embedded server.
//!
//! | Path           | Served by                                   |
//! |----------------|---------------------------------------------|
//! | `/`            | static directory, `index.html` default      |
//! | `/favicon.ico` | bundled `favicon.png`                       |
//! | `/mopidy`      | bundled directory, `mopidy.html` default    |
//! | `/mopidy/ws`   | WebSocket endpoint                          |

use axum::Router;
use axum::extract::Request;
use axum::http::Uri;
use axum::routing::get;
use tower::ServiceBuilder;
use tower::util::MapRequestLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::FrontendConfig;
use crate::ws::handler::ws_handler;

/// Path of the WebSocket endpoint.
pub const WS_PATH: &str = "/mopidy/ws";

/// Prefix of the bundled asset area.
pub const MOPIDY_PATH: &str = "/mopidy";

/// Default document of the bundled asset area.
const MOPIDY_INDEX: &str = "/mopidy.html";

/// Builds the router for one server instance.
///
/// Engine request tracing is only layered on when `access_log` is set.
pub fn mount(config: &FrontendConfig, state: AppState) -> Router {
    let static_dir = config.effective_static_dir();
    let mopidy_dir = config.data_dir.as_path();
    tracing::debug!(dir = %static_dir.display(), "HTTP server will serve static files at /");

    let mopidy_assets = ServiceBuilder::new()
        .layer(MapRequestLayer::new(into_mopidy_area))
        .service(ServeDir::new(mopidy_dir));

    let router = Router::new()
        .route(WS_PATH, get(ws_handler))
        .route_service("/favicon.ico", ServeFile::new(mopidy_dir.join("favicon.png")))
        .route_service(MOPIDY_PATH, mopidy_assets.clone())
        .route_service("/mopidy/", mopidy_assets.clone())
        .route_service("/mopidy/{*path}", mopidy_assets)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state);

    if config.access_log {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Strips the `/mopidy` prefix and points the area root at
/// `mopidy.html`.
fn into_mopidy_area(mut req: Request) -> Request {
    let path = req.uri().path();
    let rest = path.strip_prefix(MOPIDY_PATH).unwrap_or(path);
    let rest = if rest.is_empty() || rest == "/" {
        MOPIDY_INDEX
    } else {
        rest
    };
    let target = match req.uri().query() {
        Some(query) => format!("{rest}?{query}"),
        None => rest.to_string(),
    };
    if let Ok(uri) = target.parse::<Uri>() {
        *req.uri_mut() = uri;
    }
    req
}
