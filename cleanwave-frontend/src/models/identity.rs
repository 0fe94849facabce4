use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The two mutually exclusive roles a signed-in user can hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Volunteer,
    Organizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Volunteer => "volunteer",
            Role::Organizer => "organizer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Volunteer => "Volunteer",
            Role::Organizer => "Organizer",
        }
    }

    /// Landing dashboard for this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Volunteer => "/dashboard/volunteer",
            Role::Organizer => "/dashboard/organizer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volunteer" => Ok(Role::Volunteer),
            "organizer" => Ok(Role::Organizer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The signed-in user.
///
/// Serialized as `{ id, email, fullName, userType }`, the record shape kept in
/// client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "userType")]
    pub role: Role,
}

impl Identity {
    /// Creates an identity with a freshly generated identifier.
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            full_name: full_name.into(),
            role,
        }
    }

    pub fn initials(&self) -> String {
        let initials: String = self
            .full_name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .collect::<String>()
            .to_uppercase();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        self.role.dashboard_path()
    }

    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }
}
