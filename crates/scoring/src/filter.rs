//! Score classes and the green/yellow/red filter.

use crate::Road;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Traffic-light class of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreClass {
    /// score >= 20
    Green,
    /// 10 <= score < 20
    Yellow,
    /// score < 10
    Red,
}

impl ScoreClass {
    /// Classify a score.
    #[must_use]
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 20 => ScoreClass::Green,
            s if s >= 10 => ScoreClass::Yellow,
            _ => ScoreClass::Red,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreClass::Green => "green",
            ScoreClass::Yellow => "yellow",
            ScoreClass::Red => "red",
        }
    }
}

impl fmt::Display for ScoreClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which score classes are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ScoreFilter {
    pub show_green: bool,
    pub show_yellow: bool,
    pub show_red: bool,
}

impl Default for ScoreFilter {
    fn default() -> Self {
        Self {
            show_green: true,
            show_yellow: true,
            show_red: true,
        }
    }
}

impl ScoreFilter {
    /// Hide one class.
    #[must_use]
    pub fn hiding(mut self, class: ScoreClass) -> Self {
        match class {
            ScoreClass::Green => self.show_green = false,
            ScoreClass::Yellow => self.show_yellow = false,
            ScoreClass::Red => self.show_red = false,
        }
        self
    }

    /// Whether a score passes the filter.
    #[must_use]
    pub fn matches(&self, score: i32) -> bool {
        match ScoreClass::from_score(score) {
            ScoreClass::Green => self.show_green,
            ScoreClass::Yellow => self.show_yellow,
            ScoreClass::Red => self.show_red,
        }
    }

    /// Roads passing the filter, in input order.
    #[must_use]
    pub fn apply<'a>(&self, roads: &'a [Road]) -> Vec<&'a Road> {
        roads.iter().filter(|r| self.matches(r.score)).collect()
    }

    /// False when every class is hidden.
    #[must_use]
    pub fn has_any_enabled(&self) -> bool {
        self.show_green || self.show_yellow || self.show_red
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tags;

    #[test]
    fn test_class_boundaries() {
        assert_eq!(ScoreClass::from_score(20), ScoreClass::Green);
        assert_eq!(ScoreClass::from_score(19), ScoreClass::Yellow);
        assert_eq!(ScoreClass::from_score(10), ScoreClass::Yellow);
        assert_eq!(ScoreClass::from_score(9), ScoreClass::Red);
        assert_eq!(ScoreClass::from_score(0), ScoreClass::Red);
    }

    #[test]
    fn test_apply_filter() {
        let roads: Vec<Road> = [25, 15, 5]
            .into_iter()
            .map(|score| Road {
                score,
                ..Road::new(Vec::new(), Tags::new())
            })
            .collect();

        let filter = ScoreFilter::default().hiding(ScoreClass::Yellow);
        let kept: Vec<i32> = filter.apply(&roads).iter().map(|r| r.score).collect();
        assert_eq!(kept, vec![25, 5]);
    }

    #[test]
    fn test_has_any_enabled() {
        let none = ScoreFilter::default()
            .hiding(ScoreClass::Green)
            .hiding(ScoreClass::Yellow)
            .hiding(ScoreClass::Red);
        assert!(!none.has_any_enabled());
        assert!(!none.matches(50));
        assert!(ScoreFilter::default().has_any_enabled());
    }
}
