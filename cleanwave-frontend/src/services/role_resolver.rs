use crate::models::Role;

/// Decides which role a login is granted.
///
/// Sign-in call sites only see this trait, so the demo rule below can be
/// replaced by a real directory lookup without touching them.
pub trait RoleResolver: Send + Sync {
    fn resolve(&self, email: &str, requested: Role) -> Role;
}

/// Demo role inference: an email containing `organizer` always signs in as an
/// organizer, whatever role was requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoRoleInference;

impl RoleResolver for DemoRoleInference {
    fn resolve(&self, email: &str, requested: Role) -> Role {
        if requested == Role::Organizer || email.contains("organizer") {
            Role::Organizer
        } else {
            Role::Volunteer
        }
    }
}

/// Grants exactly the role the user asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedRole;

impl RoleResolver for RequestedRole {
    fn resolve(&self, _email: &str, requested: Role) -> Role {
        requested
    }
}
