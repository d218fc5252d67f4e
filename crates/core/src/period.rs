//! Half-year periods (`2024-I`, `2024-II`) and the configured period list.

use std::fmt;
use std::str::FromStr;

/// Period list used when nothing is configured.
pub const DEFAULT_PERIODS: [&str; 4] = ["2024-II", "2025-I", "2025-II", "2026-I"];

/// Error returned when a period label or period list cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPeriod {
    #[error("invalid period label {0:?}, expected YEAR-I or YEAR-II")]
    Label(String),
    #[error("period list is empty")]
    Empty,
}

/// Which half of the academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Half {
    First,
    Second,
}

impl Half {
    fn roman(self) -> &'static str {
        match self {
            Half::First => "I",
            Half::Second => "II",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub year: i64,
    pub half: Half,
}

impl Period {
    pub fn new(year: i64, half: Half) -> Self {
        Self { year, half }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.half.roman())
    }
}

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let invalid = || InvalidPeriod::Label(s.to_string());

        let (year, half) = label.rsplit_once('-').ok_or_else(invalid)?;
        let year: i64 = year.trim().parse().map_err(|_| invalid())?;
        let half = match half.trim().to_ascii_uppercase().as_str() {
            "I" => Half::First,
            "II" => Half::Second,
            _ => return Err(invalid()),
        };
        Ok(Period::new(year, half))
    }
}

/// The ordered list of periods a ledger has columns for.
///
/// Never empty: a period missing from the list is filed under slot 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodList(Vec<Period>);

impl PeriodList {
    pub fn new(periods: Vec<Period>) -> Result<Self, InvalidPeriod> {
        if periods.is_empty() {
            return Err(InvalidPeriod::Empty);
        }
        Ok(Self(periods))
    }

    /// Parse either a JSON array of labels (`["2024-II","2025-I"]`) or a
    /// comma-separated list (`2024-II, 2025-I`).
    pub fn parse(raw: &str) -> Result<Self, InvalidPeriod> {
        let trimmed = raw.trim();
        let labels: Vec<String> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed).map_err(|_| InvalidPeriod::Label(raw.to_string()))?
        } else {
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };

        let periods = labels
            .iter()
            .map(|l| l.parse())
            .collect::<Result<Vec<Period>, _>>()?;
        Self::new(periods)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(Period::to_string).collect()
    }

    /// Column index for `period`, or slot 0 when the period is not listed.
    pub fn slot_of(&self, period: &Period) -> usize {
        self.0.iter().position(|p| p == period).unwrap_or(0)
    }
}

impl Default for PeriodList {
    fn default() -> Self {
        Self(
            DEFAULT_PERIODS
                .iter()
                .filter_map(|l| l.parse().ok())
                .collect(),
        )
    }
}

impl FromStr for PeriodList {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
