//! Recent rainfall and its effect on unpaved roads.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A day counts as rainy at or above this many millimetres.
pub const RAIN_THRESHOLD_MM: f64 = 5.0;
/// Days of history looked at.
pub const DAYS_TO_CHECK: u32 = 7;
/// Rainy days needed before roads count as muddy.
pub const MIN_RAINY_DAYS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MudRisk {
    High,
    Moderate,
}

fn mud_risk(surface: Option<&str>) -> Option<MudRisk> {
    let surface = surface?.to_lowercase();
    if ["dirt", "ground", "earth", "unpaved"]
        .iter()
        .any(|m| surface.contains(m))
    {
        Some(MudRisk::High)
    } else if surface.contains("gravel") || surface.contains("compacted") {
        Some(MudRisk::Moderate)
    } else {
        None
    }
}

/// Rainfall summary for the recent past.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Days at or above [`RAIN_THRESHOLD_MM`]
    pub rainy_days: u32,
    /// Sum over all days
    pub total_precipitation_mm: f64,
    /// Per-day totals, oldest first
    pub daily_mm: Vec<f64>,
    /// At least [`MIN_RAINY_DAYS`] rainy days
    pub is_muddy: bool,
}

impl WeatherCondition {
    /// Builds a condition from daily sums; missing days count as dry.
    #[must_use]
    pub fn from_daily_precipitation(daily: &[Option<f64>]) -> Self {
        let daily_mm: Vec<f64> = daily.iter().map(|d| d.unwrap_or(0.0)).collect();
        let rainy_days = u32::try_from(
            daily_mm
                .iter()
                .filter(|mm| **mm >= RAIN_THRESHOLD_MM)
                .count(),
        )
        .unwrap_or(u32::MAX);

        Self {
            rainy_days,
            total_precipitation_mm: daily_mm.iter().sum(),
            daily_mm,
            is_muddy: rainy_days >= MIN_RAINY_DAYS,
        }
    }

    /// One-line status.
    #[must_use]
    pub fn warning_message(&self) -> String {
        if self.is_muddy {
            format!(
                "⚠️ Recent rain ({} days): Unpaved roads may be muddy",
                self.rainy_days
            )
        } else {
            "✓ Good conditions: Limited recent rain".to_string()
        }
    }

    /// Multi-line report.
    #[must_use]
    pub fn detailed_report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Past {DAYS_TO_CHECK} days:");
        let _ = writeln!(report, "• Rainy days: {}", self.rainy_days);
        let _ = writeln!(
            report,
            "• Total precipitation: {:.1} mm",
            self.total_precipitation_mm
        );
        if self.is_muddy {
            report.push_str("\n⚠️ Warning: Unpaved roads may be muddy");
        }
        report
    }

    fn excess_days(&self) -> i32 {
        i32::try_from(self.rainy_days).unwrap_or(i32::MAX) - MIN_RAINY_DAYS as i32
    }

    /// Score penalty for a surface, zero unless muddy.
    #[must_use]
    pub fn mud_penalty(&self, surface: Option<&str>) -> i32 {
        if !self.is_muddy {
            return 0;
        }
        match mud_risk(surface) {
            Some(MudRisk::High) => -15 - 5 * self.excess_days(),
            Some(MudRisk::Moderate) => -8 - 2 * self.excess_days(),
            None => 0,
        }
    }

    /// Mud warning for a surface.
    #[must_use]
    pub fn surface_warning(&self, surface: Option<&str>) -> Option<String> {
        if !self.is_muddy {
            return None;
        }
        let level = match mud_risk(surface)? {
            MudRisk::High => "High",
            MudRisk::Moderate => "Moderate",
        };
        Some(format!(
            "⚠️ {level} mud risk - {} rainy days recently",
            self.rainy_days
        ))
    }

    pub(crate) fn road_warning(&self, surface: Option<&str>) -> Option<String> {
        if !self.is_muddy {
            return None;
        }
        let prefix = match mud_risk(surface)? {
            MudRisk::High => "May be very muddy",
            MudRisk::Moderate => "May be muddy",
        };
        Some(format!(
            "⚠️ {prefix} - {} rainy days recently",
            self.rainy_days
        ))
    }
}
