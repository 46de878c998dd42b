use chrono::Weekday;
use pulse_core::weekly_update::{parse_weekday, WeekNumbering};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Schedules for the background jobs.
    pub jobs: JobsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// See [`JwtConfig::from_env`] and [`JobsConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            jobs: JobsConfig::from_env(),
        }
    }
}

/// Default delay before the first deadline sweep.
const DEFAULT_SWEEP_INITIAL_DELAY_SECS: u64 = 60;
/// Default period between deadline sweeps (24 h).
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Background job schedules.
#[derive(Debug, Clone)]
pub struct JobsConfig {
    pub deadline_sweep_initial_delay_secs: u64,
    pub deadline_sweep_interval_secs: u64,
    /// Day on which missing weekly updates are reminded. Escalation runs the day after.
    pub weekly_reminder_weekday: Weekday,
    pub week_numbering: WeekNumbering,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            deadline_sweep_initial_delay_secs: DEFAULT_SWEEP_INITIAL_DELAY_SECS,
            deadline_sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            weekly_reminder_weekday: Weekday::Fri,
            week_numbering: WeekNumbering::Iso,
        }
    }
}

impl JobsConfig {
    /// Load job schedules from environment variables.
    ///
    /// | Env Var                             | Default |
    /// |-------------------------------------|---------|
    /// | `DEADLINE_SWEEP_INITIAL_DELAY_SECS` | `60`    |
    /// | `DEADLINE_SWEEP_INTERVAL_SECS`      | `86400` |
    /// | `WEEKLY_REMINDER_WEEKDAY`           | `fri`   |
    /// | `WEEK_NUMBERING`                    | `iso`   |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values or a zero sweep interval.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let deadline_sweep_initial_delay_secs = std::env::var("DEADLINE_SWEEP_INITIAL_DELAY_SECS")
            .map(|v| {
                v.parse()
                    .expect("DEADLINE_SWEEP_INITIAL_DELAY_SECS must be a valid u64")
            })
            .unwrap_or(defaults.deadline_sweep_initial_delay_secs);

        let deadline_sweep_interval_secs: u64 = std::env::var("DEADLINE_SWEEP_INTERVAL_SECS")
            .map(|v| {
                v.parse()
                    .expect("DEADLINE_SWEEP_INTERVAL_SECS must be a valid u64")
            })
            .unwrap_or(defaults.deadline_sweep_interval_secs);
        assert!(
            deadline_sweep_interval_secs > 0,
            "DEADLINE_SWEEP_INTERVAL_SECS must be greater than zero"
        );

        let weekly_reminder_weekday = std::env::var("WEEKLY_REMINDER_WEEKDAY")
            .map(|v| parse_weekday(&v).unwrap_or_else(|e| panic!("WEEKLY_REMINDER_WEEKDAY: {e}")))
            .unwrap_or(defaults.weekly_reminder_weekday);

        let week_numbering = std::env::var("WEEK_NUMBERING")
            .map(|v| {
                WeekNumbering::from_str_value(v.trim())
                    .unwrap_or_else(|e| panic!("WEEK_NUMBERING: {e}"))
            })
            .unwrap_or(defaults.week_numbering);

        Self {
            deadline_sweep_initial_delay_secs,
            deadline_sweep_interval_secs,
            weekly_reminder_weekday,
            week_numbering,
        }
    }
}
