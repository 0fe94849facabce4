use crate::dtos::EcoBotMessage;
use crate::handlers::PageContext;
use crate::models::{Badge, EventDetail, VolunteerFixture};
use crate::services::SessionStore;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "volunteer_dashboard.html")]
pub struct VolunteerDashboardTemplate {
    pub page: PageContext,
    pub stats: VolunteerFixture,
    pub upcoming: Vec<EventDetail>,
    pub badges: Vec<Badge>,
    pub greeting: String,
}

#[derive(Template)]
#[template(path = "organizer_dashboard.html")]
pub struct OrganizerDashboardTemplate {
    pub page: PageContext,
    pub events: Vec<EventDetail>,
}

#[derive(Template)]
#[template(path = "partials/ecobot_reply.html")]
pub struct EcoBotReplyFragment {
    pub message: String,
    pub reply: String,
}

pub async fn volunteer_dashboard(
    State(state): State<AppState>,
    store: SessionStore<Session>,
) -> impl IntoResponse {
    let fixtures = &state.fixtures;
    VolunteerDashboardTemplate {
        page: PageContext::load(&store, "dashboard").await,
        stats: fixtures.volunteer.clone(),
        upcoming: fixtures.registered_events().cloned().collect(),
        badges: fixtures.volunteer.badges.clone(),
        greeting: fixtures.ecobot.greeting.clone(),
    }
}

pub async fn organizer_dashboard(
    State(state): State<AppState>,
    store: SessionStore<Session>,
) -> impl IntoResponse {
    OrganizerDashboardTemplate {
        page: PageContext::load(&store, "dashboard").await,
        events: state.fixtures.managed_events().cloned().collect(),
    }
}

/// Canned EcoBot answer. Blank messages get no reply.
pub async fn ecobot_reply(
    State(state): State<AppState>,
    Form(form): Form<EcoBotMessage>,
) -> Response {
    let message = form.message.trim();
    if message.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    EcoBotReplyFragment {
        message: message.to_string(),
        reply: state.fixtures.ecobot.reply.clone(),
    }
    .into_response()
}
