use crate::handlers::PageContext;
use crate::models::LeaderboardEntry;
use crate::services::SessionStore;
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "community.html")]
pub struct CommunityTemplate {
    pub page: PageContext,
    pub podium: Vec<LeaderboardEntry>,
    pub rest: Vec<LeaderboardEntry>,
}

pub async fn community(State(state): State<AppState>, store: SessionStore<Session>) -> impl IntoResponse {
    let (podium, rest): (Vec<_>, Vec<_>) = state
        .fixtures
        .leaderboard
        .iter()
        .cloned()
        .partition(LeaderboardEntry::is_podium);

    CommunityTemplate {
        page: PageContext::load(&store, "community").await,
        podium,
        rest,
    }
}
