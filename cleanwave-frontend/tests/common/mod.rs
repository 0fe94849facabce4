#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use cleanwave_frontend::config::Settings;
use cleanwave_frontend::services::{fixtures::FixtureCatalog, metrics::detached_handle};
use cleanwave_frontend::startup::build_router;
use cleanwave_frontend::AppState;
use tower::util::ServiceExt;

pub fn test_settings(demo_role_inference: bool) -> Settings {
    serde_json::from_value(serde_json::json!({
        "server": {
            "host": "127.0.0.1",
            "port": 0,
            "static_dir": concat!(env!("CARGO_MANIFEST_DIR"), "/static"),
        },
        "session": {
            "auth_delay_ms": 0,
            "demo_role_inference": demo_role_inference,
        },
    }))
    .expect("test settings deserialize")
}

pub fn test_app() -> Router {
    app_with(test_settings(true))
}

pub fn app_with(settings: Settings) -> Router {
    let fixtures = FixtureCatalog::bundled().expect("bundled fixtures load");
    let state = AppState::new(&settings, fixtures, detached_handle());
    build_router(state, &settings)
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    form: &str,
    cookie: Option<&str>,
    htmx: bool,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if htmx {
        builder = builder.header("hx-request", "true");
    }
    app.clone()
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

/// `name=value` part of the session cookie the response set.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Signs in through the login form and returns the session cookie.
pub async fn sign_in(app: &Router, email: &str, user_type: &str) -> String {
    let form = serde_urlencoded::to_string([
        ("email", email),
        ("password", "secret1"),
        ("user_type", user_type),
    ])
    .unwrap();
    let response = post_form(app, "/login", &form, None, false).await;
    assert_eq!(response.status(), 303, "login should redirect");
    session_cookie(&response).expect("login sets a session cookie")
}
