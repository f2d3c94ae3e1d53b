//! Server mode: renders the live listing and drives "load more"

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::ApiClient;
use crate::config::SiteConfig;
use crate::content::{ContentLoader, Page, Post};
use crate::feed::{Feed, LoadOutcome, PageFetcher};
use crate::generator::Generator;
use crate::helpers::url_for;
use crate::Blog;

/// Server state shared by every request
pub struct ServerState<F> {
    pub feed: Feed<F>,
    pub generator: Generator,
    config: SiteConfig,
    public_dir: PathBuf,
}

impl<F: PageFetcher> ServerState<F> {
    /// One listing view over `initial`, rendered for `blog`
    pub fn new(blog: &Blog, fetcher: F, initial: Page) -> crate::Result<Self> {
        Ok(Self {
            feed: Feed::new(fetcher, initial),
            generator: Generator::new(blog)?,
            config: blog.config.clone(),
            public_dir: blog.public_dir.clone(),
        })
    }

    /// The listing URL, where "load more" redirects back to
    fn home(&self) -> String {
        url_for(&self.config, "/")
    }
}

/// Errors a handler can answer with
#[derive(Debug)]
enum ServerError {
    Render(crate::Error),
}

impl From<crate::Error> for ServerError {
    fn from(err: crate::Error) -> Self {
        ServerError::Render(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Render(err) => {
                tracing::error!("Failed to render listing: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let client = blog.client()?;
    let page = ContentLoader::new(&client).load_first_page().await?;

    let state = ServerState::new(blog, client, page.clone())?;
    // Static assets (logo, user files) are served from the public dir
    state.generator.generate(&page)?;
    let app = router::<ApiClient>(Arc::new(state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for a shared listing view.
///
/// Every route lives under the configured site root, matching the links
/// the templates render.
pub fn router<F: PageFetcher + 'static>(state: Arc<ServerState<F>>) -> Router {
    let config = &state.config;
    let home = url_for(config, "/");

    let mut app = Router::new()
        .route(&home, get(index::<F>))
        .route(&url_for(config, "load-more"), post(load_more::<F>))
        .route(&url_for(config, "api/posts"), get(posts::<F>));

    let prefix = home.trim_end_matches('/');
    if !prefix.is_empty() {
        app = app.route(prefix, get(index::<F>));
    }

    app.fallback(static_files::<F>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve files from the public directory, below the site root
async fn static_files<F: PageFetcher>(
    State(state): State<Arc<ServerState<F>>>,
    request: Request<Body>,
) -> Response {
    let Some(request) = strip_root(request, &state.home()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let mut service = ServeDir::new(&state.public_dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Rewrite `/{root}/path?query` to `/path?query`; `None` outside the root
fn strip_root(request: Request<Body>, home: &str) -> Option<Request<Body>> {
    let prefix = home.trim_end_matches('/');
    if prefix.is_empty() {
        return Some(request);
    }

    let (mut parts, body) = request.into_parts();
    let rest = parts.uri.path().strip_prefix(prefix)?;
    if !rest.starts_with('/') {
        return None;
    }

    let mut uri = rest.to_string();
    if let Some(query) = parts.uri.query() {
        uri.push('?');
        uri.push_str(query);
    }
    parts.uri = uri.parse().ok()?;
    Some(Request::from_parts(parts, body))
}

async fn index<F: PageFetcher>(
    State(state): State<Arc<ServerState<F>>>,
) -> Result<Html<String>, ServerError> {
    let error = state.feed.last_error();
    let html = state
        .generator
        .render_listing(&state.feed.snapshot(), error.as_deref())?;
    Ok(Html(html))
}

async fn load_more<F: PageFetcher>(
    State(state): State<Arc<ServerState<F>>>,
) -> Result<Response, ServerError> {
    match state.feed.load_more().await {
        Ok(outcome) => {
            if outcome == LoadOutcome::InFlight {
                tracing::debug!("Redirecting while another load finishes");
            }
            Ok(Redirect::to(&state.home()).into_response())
        }
        Err(e) => {
            let message = e.to_string();
            let html = state
                .generator
                .render_listing(&state.feed.snapshot(), Some(&message))?;
            Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response())
        }
    }
}

#[derive(Serialize)]
struct PostsBody<'a> {
    results: &'a [Post],
    next_page: Option<&'a str>,
    has_more: bool,
}

async fn posts<F: PageFetcher>(State(state): State<Arc<ServerState<F>>>) -> Response {
    let snapshot = state.feed.snapshot();
    Json(PostsBody {
        results: snapshot.posts(),
        next_page: snapshot.next_page(),
        has_more: snapshot.has_more(),
    })
    .into_response()
}
