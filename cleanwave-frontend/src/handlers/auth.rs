use crate::dtos::{FieldErrors, LoginForm, SignupForm};
use crate::handlers::{form_status, push_flash, redirect_to, PageContext};
use crate::models::Identity;
use crate::routes::required_role;
use crate::services::authorization::{authorize, LANDING_PATH};
use crate::services::{SessionError, SessionStore};
use askama::Template;
use axum::{
    extract::Query,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

const LOGIN_FAILED: &str = "Invalid email or password. Please try again.";
const SIGNUP_FAILED: &str = "Failed to create account. Please try again.";
const IN_FLIGHT: &str = "A sign-in is already in progress. Please wait.";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub form: LoginForm,
    pub errors: FieldErrors,
    pub notice: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub form: SignupForm,
    pub errors: FieldErrors,
    pub notice: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

pub async fn login_page(
    store: SessionStore<Session>,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        page: PageContext::load(&store, "login").await,
        form: LoginForm {
            from: query.from,
            ..Default::default()
        },
        errors: FieldErrors::default(),
        notice: None,
    }
}

pub async fn login_handler(
    headers: HeaderMap,
    mut store: SessionStore<Session>,
    Form(mut form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        tracing::debug!(?fields, "Login form rejected");
        form.password.clear();
        return Ok(render_login(&store, &headers, form, FieldErrors::from(&errors), None).await);
    }

    let outcome = store
        .authenticate(&form.email, &form.password, form.user_type)
        .await;
    form.password.clear();

    match outcome {
        Ok(identity) => {
            rotate_session_id(store.storage()).await?;
            push_flash(store.storage(), "Login successful!").await;
            let target = post_login_target(&identity, form.return_to());
            Ok(redirect_to(&headers, &target))
        }
        Err(SessionError::Storage(e)) => Err(AppError::InternalError(e.into())),
        Err(SessionError::InFlight) => {
            tracing::info!("Login rejected while another sign-in is pending");
            Ok(render_login(&store, &headers, form, FieldErrors::default(), Some(IN_FLIGHT)).await)
        }
        Err(e) => {
            tracing::info!(reason = %e, "Login rejected");
            Ok(render_login(&store, &headers, form, FieldErrors::default(), Some(LOGIN_FAILED)).await)
        }
    }
}

pub async fn signup_page(store: SessionStore<Session>) -> impl IntoResponse {
    SignupTemplate {
        page: PageContext::load(&store, "signup").await,
        form: SignupForm::default(),
        errors: FieldErrors::default(),
        notice: None,
    }
}

pub async fn signup_handler(
    headers: HeaderMap,
    mut store: SessionStore<Session>,
    Form(mut form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        tracing::debug!(?fields, "Signup form rejected");
        form.password.clear();
        return Ok(render_signup(&store, &headers, form, FieldErrors::from(&errors), None).await);
    }

    let outcome = store
        .register(
            &form.full_name,
            &form.email,
            &form.password,
            form.user_type.unwrap_or_default(),
        )
        .await;
    form.password.clear();

    match outcome {
        Ok(_) => {
            rotate_session_id(store.storage()).await?;
            push_flash(store.storage(), "Account created successfully!").await;
            Ok(redirect_to(&headers, "/events"))
        }
        Err(SessionError::Storage(e)) => Err(AppError::InternalError(e.into())),
        Err(SessionError::InFlight) => {
            tracing::info!("Signup rejected while another sign-in is pending");
            Ok(render_signup(&store, &headers, form, FieldErrors::default(), Some(IN_FLIGHT)).await)
        }
        Err(e) => {
            tracing::info!(reason = %e, "Signup rejected");
            Ok(render_signup(&store, &headers, form, FieldErrors::default(), Some(SIGNUP_FAILED)).await)
        }
    }
}

pub async fn logout_handler(
    headers: HeaderMap,
    mut store: SessionStore<Session>,
) -> Result<Response, AppError> {
    store.sign_out().await.map_err(anyhow::Error::from)?;
    rotate_session_id(store.storage()).await?;
    Ok(redirect_to(&headers, LANDING_PATH))
}

/// Issues a fresh session id so a cookie captured before a sign-in change
/// stops resolving to the session.
async fn rotate_session_id(session: &Session) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to rotate session id: {e}")))
}

/// The remembered destination when the new identity may open it, otherwise
/// the identity's own dashboard.
fn post_login_target(identity: &Identity, from: Option<&str>) -> String {
    from.filter(|path| {
        required_role(path)
            .map(|required| authorize(required, Some(identity), path).is_permitted())
            .unwrap_or(false)
    })
    .unwrap_or(identity.dashboard_path())
    .to_string()
}

async fn render_login(
    store: &SessionStore<Session>,
    headers: &HeaderMap,
    form: LoginForm,
    errors: FieldErrors,
    notice: Option<&'static str>,
) -> Response {
    let template = LoginTemplate {
        page: PageContext::load(store, "login").await,
        form,
        errors,
        notice,
    };
    (form_status(headers), template).into_response()
}

async fn render_signup(
    store: &SessionStore<Session>,
    headers: &HeaderMap,
    form: SignupForm,
    errors: FieldErrors,
    notice: Option<&'static str>,
) -> Response {
    let template = SignupTemplate {
        page: PageContext::load(store, "signup").await,
        form,
        errors,
        notice,
    };
    (form_status(headers), template).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_post_login_target_honors_permitted_destination() {
        let volunteer = Identity::new("a@b.com", "a", Role::Volunteer);
        assert_eq!(post_login_target(&volunteer, Some("/community")), "/community");
        assert_eq!(post_login_target(&volunteer, Some("/events/2")), "/events/2");
    }

    #[test]
    fn test_post_login_target_falls_back_to_dashboard() {
        let volunteer = Identity::new("a@b.com", "a", Role::Volunteer);
        assert_eq!(
            post_login_target(&volunteer, Some("/create-event")),
            "/dashboard/volunteer"
        );
        assert_eq!(post_login_target(&volunteer, Some("/nope")), "/dashboard/volunteer");

        let organizer = Identity::new("organizer@b.com", "organizer", Role::Organizer);
        assert_eq!(post_login_target(&organizer, None), "/dashboard/organizer");
        assert_eq!(
            post_login_target(&organizer, Some("/events/1/analytics")),
            "/events/1/analytics"
        );
    }
}
