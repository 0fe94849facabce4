//! Sample records rendered by the views. Loaded from the fixture catalog and
//! never mutated.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Published,
    Draft,
}

impl EventStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Published => "Published",
            EventStatus::Draft => "Draft",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDetail {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub city: String,
    pub volunteers: u32,
    pub status: EventStatus,
    pub description: String,
    pub what_to_bring: Vec<String>,
    pub safety_protocols: Vec<String>,
}

impl EventDetail {
    /// Start time as shown on cards, e.g. `8:00 AM` from `8:00 AM - 12:00 PM`.
    pub fn start_time(&self) -> &str {
        self.time.split(" - ").next().unwrap_or(&self.time)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteStat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Badge {
    pub name: String,
    pub icon: String,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolunteerFixture {
    pub hours_this_month: u32,
    pub waste_collected: String,
    pub drives_attended: u32,
    pub registered_event_ids: Vec<String>,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub points: u32,
    pub badge: String,
}

impl LeaderboardEntry {
    pub fn is_podium(&self) -> bool {
        self.rank <= 3
    }

    pub fn medal(&self) -> &'static str {
        match self.rank {
            1 => "🏆",
            2 => "🥈",
            3 => "🥉",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WasteCategory {
    pub category: String,
    pub kg: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsFixture {
    pub checked_in: u32,
    pub registered: u32,
    pub waste_total_kg: u32,
    pub waste_target_kg: u32,
    pub waste_breakdown: Vec<WasteCategory>,
    pub social_post: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EcoBotFixture {
    pub greeting: String,
    pub reply: String,
}
