//! Authorization guard: decides whether the current identity may open a
//! destination, and where to send it otherwise.

use crate::models::{Identity, Role};
use crate::services::session_store::SessionStore;
use crate::services::storage::ClientStorage;

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const LANDING_PATH: &str = "/";

/// Query parameter carrying the originally requested destination to login.
pub const RETURN_PARAM: &str = "from";

/// Which identities a destination admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    None,
    AnyAuthenticated,
    Only(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Permit,
    /// Not signed in. `return_to` is where login should send the user back.
    RedirectToLogin { return_to: String },
    /// Signed in, but with the wrong role.
    RedirectToLanding,
}

impl Decision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Decision::Permit)
    }

    /// Location to redirect to, or `None` when permitted.
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Decision::Permit => None,
            Decision::RedirectToLanding => Some(LANDING_PATH.to_string()),
            Decision::RedirectToLogin { return_to } => {
                match serde_urlencoded::to_string([(RETURN_PARAM, return_to.as_str())]) {
                    Ok(query) => Some(format!("{LOGIN_PATH}?{query}")),
                    Err(_) => Some(LOGIN_PATH.to_string()),
                }
            }
        }
    }
}

pub fn authorize(required: RequiredRole, identity: Option<&Identity>, destination: &str) -> Decision {
    let login = || Decision::RedirectToLogin {
        return_to: destination.to_string(),
    };

    match (required, identity) {
        (RequiredRole::None, _) => Decision::Permit,
        (RequiredRole::AnyAuthenticated, Some(_)) => Decision::Permit,
        (RequiredRole::AnyAuthenticated, None) => login(),
        (RequiredRole::Only(role), Some(identity)) if identity.role == role => Decision::Permit,
        (RequiredRole::Only(_), Some(_)) => Decision::RedirectToLanding,
        (RequiredRole::Only(_), None) => login(),
    }
}

/// Borrowing view over a [`SessionStore`]; holds no state of its own and
/// consults the store on every check.
pub struct AuthorizationGuard<'a, S> {
    store: &'a SessionStore<S>,
}

impl<'a, S: ClientStorage> AuthorizationGuard<'a, S> {
    pub fn new(store: &'a SessionStore<S>) -> Self {
        Self { store }
    }

    pub fn check(&self, required: RequiredRole, destination: &str) -> Decision {
        authorize(required, self.store.current_identity(), destination)
    }
}

/// Accepts a post-login destination only if it is a local path that is not
/// itself an auth page and can be carried in a `Location` header.
pub fn safe_return_path(from: Option<&str>) -> Option<&str> {
    let path = from?.trim();
    if !path.starts_with('/')
        || path.starts_with("//")
        || path.contains('\\')
        || path.chars().any(char::is_control)
    {
        return None;
    }

    let route = path.split(['?', '#']).next().unwrap_or(path);
    if route == LOGIN_PATH || route == SIGNUP_PATH {
        return None;
    }

    Some(path)
}
