use crate::handlers::PageContext;
use crate::models::{EventDetail, SiteStat};
use crate::services::SessionStore;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub stats: Vec<SiteStat>,
    pub featured: Vec<EventDetail>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
    pub path: String,
}

pub async fn index(State(state): State<AppState>, store: SessionStore<Session>) -> impl IntoResponse {
    IndexTemplate {
        page: PageContext::load(&store, "home").await,
        stats: state.fixtures.site_stats.clone(),
        featured: state.fixtures.featured_events().cloned().collect(),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn not_found(store: SessionStore<Session>, uri: Uri) -> impl IntoResponse {
    tracing::info!(path = %uri.path(), "No route for requested path");

    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page: PageContext::load(&store, "").await,
            path: uri.path().to_string(),
        },
    )
}
