use chrono::NaiveDate;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ORIGIN: &str = "New York";
pub const DEFAULT_DESTINATION: &str = "Paris";
pub const DEFAULT_BUDGET: f64 = 1500.0;
pub const DEFAULT_TRAVELERS: u32 = 2;
pub const DEFAULT_PREFERENCES: &str = "Museums, beach, food";

const DATE_FORMAT: &str = "%B %d, %Y";

/// Travel window as chosen on the submission form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TravelDates {
    Selected {
        start: NaiveDate,
        end: NaiveDate,
    },
    #[default]
    NotSelected,
}

impl TravelDates {
    /// Build from an optional start/end pair; both or neither must be given
    pub fn from_pair(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        match (start, end) {
            (Some(start), Some(end)) => {
                if end < start {
                    eyre::bail!("End date {} is before start date {}", end, start);
                }
                Ok(Self::Selected { start, end })
            }
            (None, None) => Ok(Self::NotSelected),
            _ => eyre::bail!("Both --start and --end are required to select travel dates"),
        }
    }
}

impl fmt::Display for TravelDates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelDates::Selected { start, end } => {
                write!(f, "{} - {}", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
            }
            TravelDates::NotSelected => f.write_str("Not selected"),
        }
    }
}

/// One trip submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub dates: TravelDates,
    pub budget: f64,
    pub travelers: u32,
    pub preferences: String,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            dates: TravelDates::NotSelected,
            budget: DEFAULT_BUDGET,
            travelers: DEFAULT_TRAVELERS,
            preferences: DEFAULT_PREFERENCES.to_string(),
        }
    }
}

impl TripRequest {
    pub fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            eyre::bail!("Origin must not be empty");
        }
        if self.destination.trim().is_empty() {
            eyre::bail!("Destination must not be empty");
        }
        if self.travelers == 0 {
            eyre::bail!("At least one traveler is required");
        }
        if !self.budget.is_finite() || self.budget < 0.0 {
            eyre::bail!("Budget must be a non-negative number, got {}", self.budget);
        }
        Ok(())
    }

    /// Short label used in history listings
    pub fn summary(&self) -> String {
        format!(
            "{} → {} ({} travelers, ${})",
            self.origin, self.destination, self.travelers, self.budget
        )
    }
}
