pub mod sitemap;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::api::ContentClient;
use crate::config::Config;
use crate::routing::{Resolution, SiteRoutes};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub content: ContentClient,
    pub routes: Arc<SiteRoutes>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, content: ContentClient, routes: SiteRoutes) -> Self {
        Self {
            config: Arc::new(config),
            content,
            routes: Arc::new(routes),
        }
    }
}

/// Start the edge server and run until `shutdown` fires.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(state: AppState, shutdown: CancellationToken) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.web_host, state.config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(state);

    info!(addr = %addr, "Starting HTTP edge server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("Web server error")?;

    info!("Edge server stopped");
    Ok(())
}

/// Create the application router.
///
/// Routing rules run before route matching, so a rewritten path is matched
/// against its destination.
pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    info!(static_dir = %static_dir.display(), "Serving static files");

    let inner = Router::new()
        .route("/api/sitemap.xml", get(sitemap_xml))
        .route("/api/robots.txt", get(robots_txt))
        .route("/healthz", get(health))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state.clone());

    let routed = middleware::from_fn_with_state(state, apply_routes).layer(inner);

    Router::new()
        .fallback_service(routed)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn apply_routes(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())
        .map(str::to_string);

    let extra_headers = state.routes.headers_for(&path);

    let mut response = match state.routes.resolve(host.as_deref(), &path) {
        Resolution::Redirect { location, status } => {
            debug!(from = %path, to = %location, status = %status, "Redirect");
            (status, [(header::LOCATION, location)]).into_response()
        }
        Resolution::Rewrite(destination) => {
            debug!(from = %path, to = %destination, "Rewrite");
            let rewritten = rewrite_uri(request.uri(), &destination);
            *request.uri_mut() = rewritten;
            next.run(request).await
        }
        Resolution::PassThrough => next.run(request).await,
    };

    for (name, value) in extra_headers {
        response.headers_mut().insert(name, value);
    }
    response
}

/// Swap the path, keeping the query string.
fn rewrite_uri(uri: &Uri, destination: &str) -> Uri {
    let target = match uri.query() {
        Some(query) => format!("{destination}?{query}"),
        None => destination.to_string(),
    };
    target.parse().unwrap_or_else(|e| {
        warn!(destination = %destination, error = %e, "Unusable rewrite destination");
        uri.clone()
    })
}

async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let items = match state.content.list_blogs().await {
        Ok(page) => page.items,
        Err(e) => {
            warn!(error = %e, "Sitemap limited to static pages");
            Vec::new()
        }
    };

    let xml = sitemap::generate_sitemap(&items, &state.config.site_url);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        xml,
    )
        .into_response()
}

async fn robots_txt(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        sitemap::generate_robots(&state.config.site_url),
    )
        .into_response()
}

async fn health() -> &'static str {
    "OK"
}
