pub mod app;
pub mod auth;
pub mod community;
pub mod dashboard;
pub mod events;
pub mod metrics;
pub mod organizer;

use crate::models::Identity;
use crate::services::authorization::LANDING_PATH;
use crate::services::SessionStore;
use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

/// One-shot notification shown on the next rendered page.
const FLASH_KEY: &str = "cleanwave_flash";

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Full-page navigation for HTMX requests (`HX-Redirect`), 303 otherwise.
/// A target that is not a valid header value falls back to the landing page.
pub fn redirect_to(headers: &HeaderMap, target: &str) -> Response {
    let value = match HeaderValue::from_str(target) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Redirect target is not a valid header value");
            HeaderValue::from_static(LANDING_PATH)
        }
    };
    if is_htmx(headers) {
        (StatusCode::OK, [(HeaderName::from_static("hx-redirect"), value)]).into_response()
    } else {
        (StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response()
    }
}

/// Status for a re-rendered form. HTMX only swaps 2xx responses.
pub fn form_status(headers: &HeaderMap) -> StatusCode {
    if is_htmx(headers) {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

/// Layout data shared by every full page: who is signed in, which nav entry
/// is active and any pending flash message.
pub struct PageContext {
    identity: Option<Identity>,
    flash: Option<String>,
    pub current: &'static str,
}

impl PageContext {
    /// Consumes the pending flash message, if any.
    pub async fn load(store: &SessionStore<Session>, current: &'static str) -> Self {
        Self {
            identity: store.current_identity().cloned(),
            flash: take_flash(store.storage()).await,
            current,
        }
    }

    pub fn user(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn flash(&self) -> Option<&str> {
        self.flash.as_deref()
    }
}

pub async fn push_flash(session: &Session, message: &str) {
    if let Err(e) = session.insert(FLASH_KEY, message).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Only touches the session when a message is pending, so plain page views
/// never write the session back.
async fn take_flash(session: &Session) -> Option<String> {
    let message = match session.get::<String>(FLASH_KEY).await {
        Ok(message) => message?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash message");
            return None;
        }
    };
    if let Err(e) = session.remove_value(FLASH_KEY).await {
        tracing::warn!(error = %e, "Failed to clear flash message");
    }
    Some(message)
}
