use crate::handlers::PageContext;
use crate::models::EventDetail;
use crate::services::SessionStore;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub page: PageContext,
    pub events: Vec<EventDetail>,
}

#[derive(Template)]
#[template(path = "event_details.html")]
pub struct EventDetailsTemplate {
    pub page: PageContext,
    pub event: EventDetail,
    pub registered: bool,
}

#[derive(Template)]
#[template(path = "partials/joined.html")]
pub struct JoinedFragment {
    pub event: EventDetail,
}

pub async fn events_page(State(state): State<AppState>, store: SessionStore<Session>) -> impl IntoResponse {
    EventsTemplate {
        page: PageContext::load(&store, "events").await,
        events: state.fixtures.events.clone(),
    }
}

pub async fn event_details(
    State(state): State<AppState>,
    store: SessionStore<Session>,
    Path(id): Path<String>,
) -> Response {
    let Some(event) = state.fixtures.event(&id).cloned() else {
        return unknown_event(&store, &id).await;
    };

    // Only the sample volunteer's registrations are known.
    let registered = store.is_authenticated()
        && state
            .fixtures
            .volunteer
            .registered_event_ids
            .iter()
            .any(|registered| registered == &id);

    EventDetailsTemplate {
        page: PageContext::load(&store, "events").await,
        event,
        registered,
    }
    .into_response()
}

/// Stand-in registration: nothing is recorded.
pub async fn join_event(
    State(state): State<AppState>,
    store: SessionStore<Session>,
    Path(id): Path<String>,
) -> Response {
    let Some(event) = state.fixtures.event(&id).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(identity) = store.current_identity() {
        tracing::info!(user_id = %identity.id, event_id = %event.id, "Volunteer joined event");
    }

    JoinedFragment { event }.into_response()
}

pub(crate) async fn unknown_event(store: &SessionStore<Session>, id: &str) -> Response {
    tracing::info!(event_id = %id, "Unknown event requested");
    (
        StatusCode::NOT_FOUND,
        super::app::NotFoundTemplate {
            page: PageContext::load(store, "events").await,
            path: format!("/events/{id}"),
        },
    )
        .into_response()
}
