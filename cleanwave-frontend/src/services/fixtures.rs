//! Sample content for the presentation views.
//!
//! The catalog is supplied from outside the code: either the JSON file named
//! in configuration or the seed bundled with the crate.

use crate::models::{
    AnalyticsFixture, EcoBotFixture, EventDetail, EventStatus, LeaderboardEntry, SiteStat,
    VolunteerFixture,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUNDLED_SEED: &str = include_str!("../../fixtures/seed.json");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fixture data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Fixture references unknown event id {0}")]
    UnknownEvent(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCatalog {
    pub site_stats: Vec<SiteStat>,
    pub events: Vec<EventDetail>,
    pub managed_event_ids: Vec<String>,
    pub volunteer: VolunteerFixture,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub analytics: AnalyticsFixture,
    pub ecobot: EcoBotFixture,
}

impl FixtureCatalog {
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(BUNDLED_SEED)
    }

    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Loads the configured file, or the bundled seed when none is set.
    pub fn load(path: Option<&Path>) -> Result<Self, FixtureError> {
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading fixtures");
                Self::from_path(path)
            }
            None => Self::bundled(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        let catalog: FixtureCatalog = serde_json::from_str(raw)?;
        catalog.check_references()?;
        Ok(catalog)
    }

    fn check_references(&self) -> Result<(), FixtureError> {
        self.managed_event_ids
            .iter()
            .chain(self.volunteer.registered_event_ids.iter())
            .try_for_each(|id| match self.event(id) {
                Some(_) => Ok(()),
                None => Err(FixtureError::UnknownEvent(id.clone())),
            })
    }

    pub fn event(&self, id: &str) -> Option<&EventDetail> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Events shown on the landing page.
    pub fn featured_events(&self) -> impl Iterator<Item = &EventDetail> {
        self.published_events().take(3)
    }

    pub fn published_events(&self) -> impl Iterator<Item = &EventDetail> {
        self.events
            .iter()
            .filter(|e| e.status == EventStatus::Published)
    }

    pub fn managed_events(&self) -> impl Iterator<Item = &EventDetail> {
        self.managed_event_ids.iter().filter_map(|id| self.event(id))
    }

    pub fn registered_events(&self) -> impl Iterator<Item = &EventDetail> {
        self.volunteer
            .registered_event_ids
            .iter()
            .filter_map(|id| self.event(id))
    }
}
