pub mod auth;
pub mod event;

pub use auth::{LoginForm, SignupForm};
pub use event::{CreateEventForm, EcoBotMessage};

use std::collections::HashMap;
use validator::ValidationErrors;

/// First validation message per form field, for inline rendering.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let messages = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                let first = errs.first()?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                Some((field.to_string(), message))
            })
            .collect();
        Self(messages)
    }
}
