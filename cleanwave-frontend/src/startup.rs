use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, MethodRouter},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Settings;
use crate::handlers::{
    app::{health_check, index, not_found},
    auth::{login_handler, login_page, logout_handler, signup_handler, signup_page},
    community::community,
    dashboard::{ecobot_reply, organizer_dashboard, volunteer_dashboard},
    events::{event_details, events_page, join_event},
    metrics::metrics,
    organizer::{create_event_handler, create_event_page, event_analytics, social_post},
};
use crate::middleware::auth::{require_role, RouteAccess};
use crate::routes::{Action, View, ACTION_TABLE, ROUTE_TABLE};
use crate::services::RequiredRole;
use crate::AppState;

pub fn build_router(state: AppState, settings: &Settings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(settings.session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            settings.session.expiry_hours,
        )));

    let mut router = Router::new();
    for spec in ROUTE_TABLE {
        router = router.route(spec.path, guarded(view_route(spec.view), spec.required, &state));
    }
    for spec in ACTION_TABLE {
        router = router.route(
            spec.path,
            guarded(action_route(spec.action), spec.required, &state),
        );
    }

    router
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .nest_service("/static", ServeDir::new(&settings.server.static_dir))
        .fallback(not_found)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn view_route(view: View) -> MethodRouter<AppState> {
    match view {
        View::Index => get(index),
        View::Login => get(login_page).post(login_handler),
        View::Signup => get(signup_page).post(signup_handler),
        View::Events => get(events_page),
        View::EventDetails => get(event_details),
        View::EventAnalytics => get(event_analytics),
        View::VolunteerDashboard => get(volunteer_dashboard),
        View::OrganizerDashboard => get(organizer_dashboard),
        View::CreateEvent => get(create_event_page).post(create_event_handler),
        View::Community => get(community),
    }
}

fn action_route(action: Action) -> MethodRouter<AppState> {
    match action {
        Action::Logout => post(logout_handler),
        Action::JoinEvent => post(join_event),
        Action::SocialPost => post(social_post),
        Action::EcoBot => post(ecobot_reply),
    }
}

/// Puts the role guard in front of a route unless the route is public.
fn guarded(route: MethodRouter<AppState>, required: RequiredRole, state: &AppState) -> MethodRouter<AppState> {
    if required == RequiredRole::None {
        return route;
    }

    route.route_layer(from_fn_with_state(
        RouteAccess {
            app: state.clone(),
            required,
        },
        require_role,
    ))
}
