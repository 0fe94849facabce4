use crate::models::Role;
use crate::services::authorization::safe_return_path;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

static FULL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("full name pattern is valid"));

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    #[serde(default)]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 100,
        message = "Password must be between 6 and 100 characters long"
    ))]
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub user_type: Role,

    /// Destination the guard sent the user away from.
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(
        length(min = 2, max = 50, message = "Full name must be between 2 and 50 characters"),
        regex(path = *FULL_NAME_RE, message = "Full name can only contain letters and spaces")
    )]
    #[serde(default)]
    pub full_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    #[serde(default)]
    pub email: String,

    #[validate(
        length(
            min = 6,
            max = 100,
            message = "Password must be between 6 and 100 characters long"
        ),
        custom(function = "validate_password_strength")
    )]
    #[serde(default)]
    pub password: String,

    #[validate(required(message = "Please select a user type"))]
    #[serde(default)]
    pub user_type: Option<Role>,
}

impl LoginForm {
    /// The `from` destination, if it is a safe local path.
    pub fn return_to(&self) -> Option<&str> {
        safe_return_path(self.from.as_deref())
    }
}

impl SignupForm {
    /// Role value of the selected radio, empty when none is selected.
    pub fn selected_role(&self) -> &'static str {
        self.user_type.map(|role| role.as_str()).unwrap_or("")
    }
}

/// At least one lowercase letter, one uppercase letter and one digit.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_lower && has_upper && has_digit {
        return Ok(());
    }

    let mut error = ValidationError::new("password_strength");
    error.message = Some(Cow::Borrowed(
        "Password must contain at least one uppercase letter, one lowercase letter, and one number",
    ));
    Err(error)
}
