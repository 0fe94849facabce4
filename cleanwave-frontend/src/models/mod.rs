pub mod event;
pub mod identity;

pub use event::{
    AnalyticsFixture, Badge, EcoBotFixture, EventDetail, EventStatus, LeaderboardEntry, SiteStat,
    VolunteerFixture, WasteCategory,
};
pub use identity::{Identity, Role};
