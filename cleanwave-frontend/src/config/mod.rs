use serde::Deserialize;
use service_core::error::AppError;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub fixtures: FixtureSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("cleanwave-frontend/static")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Sessions expire after this many hours without a request.
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookie: bool,
    /// Simulated latency of sign-in and sign-up.
    #[serde(default = "default_auth_delay_ms")]
    pub auth_delay_ms: u64,
    /// Grant the organizer role to any email containing "organizer".
    #[serde(default = "default_demo_role_inference")]
    pub demo_role_inference: bool,
}

impl SessionSettings {
    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            expiry_hours: default_expiry_hours(),
            secure_cookie: false,
            auth_delay_ms: default_auth_delay_ms(),
            demo_role_inference: default_demo_role_inference(),
        }
    }
}

fn default_expiry_hours() -> i64 {
    24
}

fn default_auth_delay_ms() -> u64 {
    1000
}

fn default_demo_role_inference() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC endpoint; traces stay local when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "cleanwave-frontend".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FixtureSettings {
    /// JSON fixture file; the bundled seed is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Check if we're already in the crate directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("cleanwave-frontend") {
        base_path.join("config")
    } else {
        base_path.join("cleanwave-frontend").join("config")
    };

    service_core::config::load_settings(&configuration_directory)
}
