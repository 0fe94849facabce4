use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern is valid"));

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateEventForm {
    #[validate(length(min = 5, max = 100, message = "Event title must be between 5 and 100 characters"))]
    #[serde(default)]
    pub title: String,

    #[validate(length(
        min = 20,
        max = 1000,
        message = "Description must be between 20 and 1000 characters"
    ))]
    #[serde(default)]
    pub description: String,

    #[validate(length(min = 5, max = 100, message = "Location must be between 5 and 100 characters"))]
    #[serde(default)]
    pub location: String,

    #[validate(custom(function = "validate_event_date"))]
    #[serde(default)]
    pub date: String,

    #[validate(
        length(min = 1, message = "Please select a time"),
        regex(path = *TIME_RE, message = "Please enter a valid time format")
    )]
    #[serde(default)]
    pub time: String,
}

impl CreateEventForm {
    /// Parsed schedule; only meaningful once the form has validated.
    pub fn schedule(&self) -> Option<(NaiveDate, NaiveTime)> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M").ok()?;
        Some((date, time))
    }
}

fn validate_event_date(value: &str) -> Result<(), ValidationError> {
    let message = if value.is_empty() {
        "Please select a date"
    } else if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
        "Please enter a valid date"
    } else {
        return Ok(());
    };

    let mut error = ValidationError::new("date");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}

/// A message typed into the EcoBot chat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EcoBotMessage {
    #[serde(default)]
    pub message: String,
}
