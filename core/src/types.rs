use std::collections::HashMap;
use std::fmt;

use time::OffsetDateTime;

/// Largest relative move a single update may apply to a price.
pub const MAX_PRICE_CHANGE: f64 = 0.10;

/// Decimal odds with two fractional digits, stored as hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u32);

impl Price {
    pub const MIN: Price = Price(101);
    pub const MAX: Price = Price(500);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Clamp into `[MIN, MAX]` and round to two decimals.
    pub fn from_f64_clamped(value: f64) -> Self {
        let value = if value.is_finite() {
            value
        } else {
            Self::MIN.as_f64()
        };
        let clamped = value.clamp(Self::MIN.as_f64(), Self::MAX.as_f64());
        Self((clamped * 100.0).round() as u32)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    /// Ties report `Decrease`.
    pub fn between(old: Price, new: Price) -> Self {
        if new > old {
            Direction::Increase
        } else {
            Direction::Decrease
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
        }
    }
}

/// Option id -> direction of the most recent highlighted move.
pub type Highlights = HashMap<String, Direction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sport {
    Soccer,
    Basketball,
    Tennis,
    Baseball,
    Football,
    Hockey,
}

#[derive(Debug)]
pub struct SportConfig {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: u32,
    pub leagues: &'static [&'static str],
}

const SOCCER: SportConfig = SportConfig {
    name: "Soccer",
    icon: "⚽",
    color: 0x4ade80,
    leagues: &[
        "Premier League",
        "La Liga",
        "Serie A",
        "Bundesliga",
        "Champions League",
    ],
};
const BASKETBALL: SportConfig = SportConfig {
    name: "Basketball",
    icon: "🏀",
    color: 0xfb923c,
    leagues: &["NBA", "EuroLeague", "NCAA", "WNBA"],
};
const TENNIS: SportConfig = SportConfig {
    name: "Tennis",
    icon: "🎾",
    color: 0xfacc15,
    leagues: &["ATP", "WTA", "Grand Slam"],
};
const BASEBALL: SportConfig = SportConfig {
    name: "Baseball",
    icon: "⚾",
    color: 0x60a5fa,
    leagues: &["MLB", "World Series"],
};
const FOOTBALL: SportConfig = SportConfig {
    name: "American Football",
    icon: "🏈",
    color: 0xc084fc,
    leagues: &["NFL", "NCAA Football"],
};
const HOCKEY: SportConfig = SportConfig {
    name: "Hockey",
    icon: "🏒",
    color: 0x22d3ee,
    leagues: &["NHL", "KHL"],
};

impl Sport {
    pub const ALL: [Sport; 6] = [
        Sport::Soccer,
        Sport::Basketball,
        Sport::Tennis,
        Sport::Baseball,
        Sport::Football,
        Sport::Hockey,
    ];

    pub fn config(self) -> &'static SportConfig {
        match self {
            Sport::Soccer => &SOCCER,
            Sport::Basketball => &BASKETBALL,
            Sport::Tennis => &TENNIS,
            Sport::Baseball => &BASEBALL,
            Sport::Football => &FOOTBALL,
            Sport::Hockey => &HOCKEY,
        }
    }
}

/// A market known to the board and the labels of its options, in order.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTemplate {
    pub name: &'static str,
    pub options: &'static [&'static str],
}

pub const CATEGORIES: [CategoryTemplate; 4] = [
    CategoryTemplate {
        name: "1X2",
        options: &["1", "X", "2"],
    },
    CategoryTemplate {
        name: "Double Chance",
        options: &["1X", "12", "X2"],
    },
    CategoryTemplate {
        name: "Total",
        options: &["Over 2.5", "Under 2.5"],
    },
    CategoryTemplate {
        name: "Both Teams Score",
        options: &["Yes", "No"],
    },
];

pub fn option_id(match_index: usize, category: &str, option_name: &str) -> String {
    format!("match-{match_index}-{category}-{option_name}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct BettingOption {
    pub id: String,
    pub name: String,
    pub value: Price,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketCategory {
    pub name: String,
    pub options: Vec<BettingOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    pub sport: Sport,
    pub team1: String,
    pub team2: String,
    pub league: String,
    pub start_time: String,
    pub score: String,
    pub is_live: bool,
    pub betting_options: Vec<MarketCategory>,
}

impl Match {
    pub fn category(&self, name: &str) -> Option<&MarketCategory> {
        self.betting_options.iter().find(|c| c.name == name)
    }
}

/// Inclusive index window into the match sequence. `{0, 0}` doubles as the
/// empty range when there are no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub const EMPTY: VisibleRange = VisibleRange { start: 0, end: 0 };

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Indices of the range that exist in a collection of `total` rows.
    pub fn indices(&self, total: usize) -> std::ops::Range<usize> {
        if total == 0 {
            return 0..0;
        }
        let start = self.start.min(total);
        let end = self.end.saturating_add(1).min(total);
        start..end.max(start)
    }
}

/// Descriptor emitted by the update feed. The consumer decides the new price.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    pub match_index: usize,
    pub category: String,
    pub option_index: usize,
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUpdate {
    pub option_id: String,
    pub match_index: usize,
    pub old_value: Price,
    pub new_value: Price,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub total: usize,
    pub live: usize,
    pub selected: usize,
    pub dropped_updates: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_displays_two_decimals() {
        let price = Price::from_hundredths(210);
        assert_eq!(price.as_f64(), 2.1);
        assert_eq!(price.to_string(), "2.10");
        assert_eq!(Price::from_hundredths(500).to_string(), "5.00");
        assert_eq!(Price::from_hundredths(101).to_string(), "1.01");
    }

    #[test]
    fn price_clamps_into_range() {
        assert_eq!(Price::from_f64_clamped(0.5), Price::MIN);
        assert_eq!(Price::from_f64_clamped(9.0), Price::MAX);
        assert_eq!(Price::from_f64_clamped(f64::NAN), Price::MIN);
        assert_eq!(Price::from_f64_clamped(2.0 * 1.05).to_string(), "2.10");
    }

    #[test]
    fn direction_tie_is_decrease() {
        let p = Price::from_hundredths(200);
        assert_eq!(Direction::between(p, p), Direction::Decrease);
        assert_eq!(
            Direction::between(p, Price::from_hundredths(201)),
            Direction::Increase
        );
    }

    #[test]
    fn visible_range_indices_clip_to_total() {
        let range = VisibleRange { start: 5, end: 20 };
        assert_eq!(range.indices(10), 5..10);
        assert_eq!(range.indices(0), 0..0);
        assert!(range.contains(5) && range.contains(20) && !range.contains(21));
        assert_eq!(range.len(), 16);
    }
}
