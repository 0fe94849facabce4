use crate::dtos::{CreateEventForm, FieldErrors};
use crate::handlers::events::unknown_event;
use crate::handlers::{form_status, push_flash, redirect_to, PageContext};
use crate::models::{AnalyticsFixture, EventDetail};
use crate::services::SessionStore;
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "create_event.html")]
pub struct CreateEventTemplate {
    pub page: PageContext,
    pub form: CreateEventForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "event_analytics.html")]
pub struct EventAnalyticsTemplate {
    pub page: PageContext,
    pub event: EventDetail,
    pub analytics: AnalyticsFixture,
    pub attendance_percent: u32,
    pub target_percent: u32,
    pub bars: Vec<WasteBar>,
}

/// One row of the waste breakdown chart, sized against the heaviest category.
pub struct WasteBar {
    pub category: String,
    pub kg: u32,
    pub width: u32,
}

#[derive(Template)]
#[template(path = "partials/social_post.html")]
pub struct SocialPostFragment {
    pub post: String,
}

fn waste_bars(analytics: &AnalyticsFixture) -> Vec<WasteBar> {
    let heaviest = analytics
        .waste_breakdown
        .iter()
        .map(|c| c.kg)
        .max()
        .unwrap_or(0);

    analytics
        .waste_breakdown
        .iter()
        .map(|c| WasteBar {
            category: c.category.clone(),
            kg: c.kg,
            width: percent(c.kg, heaviest),
        })
        .collect()
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        0
    } else {
        let ratio = u64::from(part) * 100 / u64::from(whole);
        u32::try_from(ratio).unwrap_or(u32::MAX)
    }
}

pub async fn create_event_page(store: SessionStore<Session>) -> impl IntoResponse {
    CreateEventTemplate {
        page: PageContext::load(&store, "dashboard").await,
        form: CreateEventForm::default(),
        errors: FieldErrors::default(),
    }
}

/// Validates and acknowledges a new event. Nothing is persisted.
pub async fn create_event_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    store: SessionStore<Session>,
    Form(form): Form<CreateEventForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        tracing::debug!(?fields, "Create event form rejected");

        let template = CreateEventTemplate {
            page: PageContext::load(&store, "dashboard").await,
            form,
            errors: FieldErrors::from(&errors),
        };
        return (form_status(&headers), template).into_response();
    }

    let delay = state.session.auth_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let (Some(identity), Some((date, time))) = (store.current_identity(), form.schedule()) {
        tracing::info!(
            user_id = %identity.id,
            title = %form.title,
            date = %date,
            time = %time,
            "Event created"
        );
    }

    push_flash(store.storage(), "Event created successfully!").await;
    redirect_to(&headers, "/dashboard/organizer")
}

pub async fn event_analytics(
    State(state): State<AppState>,
    store: SessionStore<Session>,
    Path(id): Path<String>,
) -> Response {
    let Some(event) = state.fixtures.event(&id).cloned() else {
        return unknown_event(&store, &id).await;
    };

    let analytics = state.fixtures.analytics.clone();
    EventAnalyticsTemplate {
        page: PageContext::load(&store, "dashboard").await,
        event,
        attendance_percent: percent(analytics.checked_in, analytics.registered),
        target_percent: percent(analytics.waste_total_kg, analytics.waste_target_kg),
        bars: waste_bars(&analytics),
        analytics,
    }
    .into_response()
}

pub async fn social_post(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if state.fixtures.event(&id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    SocialPostFragment {
        post: state.fixtures.analytics.social_post.clone(),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(57, 64), 89);
        assert_eq!(percent(120, 100), 120);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(50_000_000, 100_000_000), 50);
        assert_eq!(percent(u32::MAX, u32::MAX), 100);
        assert_eq!(percent(u32::MAX, 1), u32::MAX);
    }

    #[test]
    fn test_waste_bars_scale_to_heaviest() {
        let analytics = crate::services::FixtureCatalog::bundled().unwrap().analytics;
        let bars = waste_bars(&analytics);

        assert_eq!(bars.len(), analytics.waste_breakdown.len());
        assert_eq!(bars.iter().map(|b| b.width).max(), Some(100));
        assert!(bars.iter().all(|b| b.width <= 100));
    }
}
