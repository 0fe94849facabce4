use crate::handlers::redirect_to;
use crate::services::{AuthorizationGuard, RequiredRole, SessionStore};
use crate::AppState;
use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, Method, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

/// Session store over the requesting browser's session, restored afresh for
/// every request. Requests carrying the same session id share one busy flag.
#[async_trait]
impl<S> FromRequestParts<S> for SessionStore<Session>
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejection.into_response())?;

        let app = AppState::from_ref(state);
        let busy = session.id().map(|id| app.busy.indicator(&id.to_string()));
        let mut store = app.session_store(session);
        if let Some(busy) = busy {
            store = store.with_busy_indicator(busy);
        }
        store.restore().await;
        Ok(store)
    }
}

/// Per-route guard state: the app plus the route's required role.
#[derive(Clone)]
pub struct RouteAccess {
    pub app: AppState,
    pub required: RequiredRole,
}

impl FromRef<RouteAccess> for AppState {
    fn from_ref(access: &RouteAccess) -> Self {
        access.app.clone()
    }
}

pub async fn require_role(
    State(access): State<RouteAccess>,
    store: SessionStore<Session>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let destination = return_destination(&request);
    let decision = AuthorizationGuard::new(&store).check(access.required, &destination);

    match decision.redirect_target() {
        None => next.run(request).await,
        Some(target) => {
            tracing::info!(
                path = %request.uri().path(),
                required = ?access.required,
                decision = ?decision,
                "Navigation denied"
            );
            redirect_to(request.headers(), &target)
        }
    }
}

/// Where login should return to. Form posts return to the page they were
/// submitted from rather than to the action URL.
fn return_destination(request: &Request<Body>) -> String {
    let uri = request.uri();
    if request.method() == Method::GET || request.method() == Method::HEAD {
        return uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
    }

    request
        .headers()
        .get("hx-current-url")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Uri>().ok())
        .map(|current| current.path().to_string())
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_destination_for_get_keeps_query() {
        let request = Request::builder()
            .uri("/events/1/analytics?tab=waste")
            .body(Body::empty())
            .unwrap();
        assert_eq!(return_destination(&request), "/events/1/analytics?tab=waste");
    }

    #[test]
    fn test_return_destination_for_post_uses_current_url() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/events/2/join")
            .header("hx-current-url", "http://localhost:9010/events/2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(return_destination(&request), "/events/2");

        let bare = Request::builder()
            .method(Method::POST)
            .uri("/ecobot")
            .body(Body::empty())
            .unwrap();
        assert_eq!(return_destination(&bare), "/");
    }
}
