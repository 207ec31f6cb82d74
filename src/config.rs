//! Server-wide settings that are fixed at start-up.

use crate::backend::PasswordHash;

/// Where the dashboard charts get their data from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartSource {
    /// Fixed demonstration datasets that do not depend on the user's records.
    #[default]
    Placeholder,
    /// Series derived from the user's transactions.
    Live,
}

/// The configuration shared by every request handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The data source for the dashboard charts.
    pub chart_source: ChartSource,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            local_timezone: "Etc/UTC".to_owned(),
            chart_source: ChartSource::default(),
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Set the canonical timezone name used to display dates.
    pub fn with_timezone(mut self, local_timezone: &str) -> Self {
        self.local_timezone = local_timezone.to_owned();
        self
    }

    /// Set the data source for the dashboard charts.
    pub fn with_chart_source(mut self, chart_source: ChartSource) -> Self {
        self.chart_source = chart_source;
        self
    }

    /// Set the bcrypt cost for new password hashes.
    ///
    /// Tests use [bcrypt::MIN_COST] to keep hashing fast.
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}
