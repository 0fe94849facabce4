//! Declarative route table. `startup::build_router` mounts every entry behind
//! the guard with its required role.

use crate::models::Role;
use crate::services::RequiredRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    Login,
    Signup,
    Events,
    EventDetails,
    EventAnalytics,
    VolunteerDashboard,
    OrganizerDashboard,
    CreateEvent,
    Community,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub path: &'static str,
    pub view: View,
    pub required: RequiredRole,
}

pub const ROUTE_TABLE: &[RouteSpec] = &[
    RouteSpec {
        path: "/",
        view: View::Index,
        required: RequiredRole::None,
    },
    RouteSpec {
        path: "/login",
        view: View::Login,
        required: RequiredRole::None,
    },
    RouteSpec {
        path: "/signup",
        view: View::Signup,
        required: RequiredRole::None,
    },
    RouteSpec {
        path: "/events",
        view: View::Events,
        required: RequiredRole::None,
    },
    RouteSpec {
        path: "/events/:id",
        view: View::EventDetails,
        required: RequiredRole::None,
    },
    RouteSpec {
        path: "/events/:id/analytics",
        view: View::EventAnalytics,
        required: RequiredRole::Only(Role::Organizer),
    },
    RouteSpec {
        path: "/dashboard/volunteer",
        view: View::VolunteerDashboard,
        required: RequiredRole::Only(Role::Volunteer),
    },
    RouteSpec {
        path: "/dashboard/organizer",
        view: View::OrganizerDashboard,
        required: RequiredRole::Only(Role::Organizer),
    },
    RouteSpec {
        path: "/create-event",
        view: View::CreateEvent,
        required: RequiredRole::Only(Role::Organizer),
    },
    RouteSpec {
        path: "/community",
        view: View::Community,
        required: RequiredRole::AnyAuthenticated,
    },
];

/// POST endpoints that answer with a redirect or an HTMX fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Logout,
    JoinEvent,
    SocialPost,
    EcoBot,
}

#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub path: &'static str,
    pub action: Action,
    pub required: RequiredRole,
}

pub const ACTION_TABLE: &[ActionSpec] = &[
    ActionSpec {
        path: "/logout",
        action: Action::Logout,
        required: RequiredRole::None,
    },
    ActionSpec {
        path: "/events/:id/join",
        action: Action::JoinEvent,
        required: RequiredRole::AnyAuthenticated,
    },
    ActionSpec {
        path: "/events/:id/analytics/social-post",
        action: Action::SocialPost,
        required: RequiredRole::Only(Role::Organizer),
    },
    ActionSpec {
        path: "/ecobot",
        action: Action::EcoBot,
        required: RequiredRole::Only(Role::Volunteer),
    },
];

/// Required role of the view serving `path`, or `None` when no view
/// matches (the not-found view, which is public).
pub fn required_role(path: &str) -> Option<RequiredRole> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    ROUTE_TABLE
        .iter()
        .find(|spec| matches_pattern(spec.path, path))
        .map(|spec| spec.required)
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let matched = if expected.starts_with(':') {
                    !actual.is_empty()
                } else {
                    expected == actual
                };
                if !matched {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
