//! Optional match-day signals: weather, half-time scoring split and playstyle.
//!
//! Each record can be supplied already classified, or derived here from the raw
//! numbers the fetch layer collects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherImpact {
    Negative,
    SlightNegative,
    Neutral,
    Positive,
}

impl WeatherImpact {
    /// Change to the expected match total.
    pub fn goals_adjustment(self) -> f64 {
        match self {
            WeatherImpact::Negative => -0.3,
            WeatherImpact::SlightNegative => -0.2,
            WeatherImpact::Positive => 0.1,
            WeatherImpact::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    #[serde(default)]
    pub wind_speed_ms: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rain: bool,
    #[serde(default)]
    pub snow: bool,
    /// Pre-classified impact; derived from the fields above when absent.
    #[serde(default)]
    pub impact: Option<WeatherImpact>,
}

impl WeatherReport {
    pub fn impact(&self) -> WeatherImpact {
        if let Some(impact) = self.impact {
            return impact;
        }

        let mut adverse = 0u8;
        if self.snow {
            adverse += 2;
        } else if self.rain {
            adverse += 1;
        }

        if self.wind_speed_ms > 10.0 {
            adverse += 2;
        } else if self.wind_speed_ms > 7.0 {
            adverse += 1;
        }

        let t = self.temperature_c;
        if !(-5.0..=35.0).contains(&t) {
            adverse += 2;
        } else if !(5.0..=30.0).contains(&t) {
            adverse += 1;
        }

        let ideal = (15.0..=25.0).contains(&t)
            && self.description.to_lowercase().contains("clear")
            && self.wind_speed_ms < 5.0;

        if adverse >= 3 {
            WeatherImpact::Negative
        } else if adverse >= 1 {
            WeatherImpact::SlightNegative
        } else if ideal {
            WeatherImpact::Positive
        } else {
            WeatherImpact::Neutral
        }
    }

    pub fn conditions(&self) -> String {
        let mut parts = vec![format!("{:.0}°C", self.temperature_c)];
        if self.snow {
            parts.push("снег".to_string());
        } else if self.rain {
            parts.push("дождь".to_string());
        } else if !self.description.trim().is_empty() {
            parts.push(self.description.trim().to_string());
        }
        if self.wind_speed_ms > 5.0 {
            parts.push(format!("ветер {:.0} м/с", self.wind_speed_ms));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfTendency {
    FirstHalf,
    SecondHalf,
    Balanced,
}

impl HalfTendency {
    pub fn label(self) -> &'static str {
        match self {
            HalfTendency::FirstHalf => "больше голов в 1-м тайме",
            HalfTendency::SecondHalf => "больше голов во 2-м тайме",
            HalfTendency::Balanced => "равномерно по таймам",
        }
    }
}

/// Half-time and full-time goals scored/conceded by one team in one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfSplitScore {
    pub ht_scored: u32,
    pub ht_conceded: u32,
    pub ft_scored: u32,
    pub ft_conceded: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalftimeProfile {
    pub tendency: HalfTendency,
    #[serde(default)]
    pub matches_analyzed: usize,
    #[serde(default)]
    pub avg_first_half_scored: f64,
    #[serde(default)]
    pub avg_second_half_scored: f64,
}

impl HalftimeProfile {
    /// `None` when no match has a consistent half-time/full-time score.
    pub fn from_matches(matches: &[HalfSplitScore]) -> Option<Self> {
        let mut first = 0u32;
        let mut second = 0u32;
        let mut n = 0usize;
        for m in matches {
            // A full-time score below the half-time one is a feed error.
            if m.ft_scored < m.ht_scored || m.ft_conceded < m.ht_conceded {
                continue;
            }
            first += m.ht_scored;
            second += m.ft_scored - m.ht_scored;
            n += 1;
        }
        if n == 0 {
            return None;
        }

        let avg_first = first as f64 / n as f64;
        let avg_second = second as f64 / n as f64;
        let tendency = if avg_first > avg_second * 1.3 {
            HalfTendency::FirstHalf
        } else if avg_second > avg_first * 1.3 {
            HalfTendency::SecondHalf
        } else {
            HalfTendency::Balanced
        };

        Some(Self {
            tendency,
            matches_analyzed: n,
            avg_first_half_scored: avg_first,
            avg_second_half_scored: avg_second,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackingStyle {
    Aggressive,
    Moderate,
    Defensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PossessionStyle {
    Possession,
    Counter,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pressing {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playstyle {
    pub attacking: AttackingStyle,
    pub possession: PossessionStyle,
    #[serde(default = "default_pressing")]
    pub pressing: Pressing,
}

fn default_pressing() -> Pressing {
    Pressing::Medium
}

impl Playstyle {
    pub fn from_averages(avg_scored: f64, avg_conceded: f64) -> Self {
        let attacking = if avg_scored >= 2.0 {
            AttackingStyle::Aggressive
        } else if avg_scored >= 1.2 {
            AttackingStyle::Moderate
        } else {
            AttackingStyle::Defensive
        };
        let pressing = if avg_conceded < 1.0 {
            Pressing::High
        } else if avg_conceded < 1.5 {
            Pressing::Medium
        } else {
            Pressing::Low
        };
        let possession = if avg_scored > avg_conceded * 1.5 {
            PossessionStyle::Possession
        } else if avg_scored < avg_conceded {
            PossessionStyle::Counter
        } else {
            PossessionStyle::Balanced
        };
        Self {
            attacking,
            possession,
            pressing,
        }
    }

    pub fn description(&self) -> String {
        let possession = match self.possession {
            PossessionStyle::Possession => "Контроль мяча",
            PossessionStyle::Counter => "Контратаки",
            PossessionStyle::Balanced => "Сбалансированная игра",
        };
        let attacking = match self.attacking {
            AttackingStyle::Aggressive => "Агрессивная атака",
            AttackingStyle::Moderate => "Умеренная атака",
            AttackingStyle::Defensive => "Оборонительная тактика",
        };
        let pressing = match self.pressing {
            Pressing::High => "Высокий прессинг",
            Pressing::Medium => "Средний прессинг",
            Pressing::Low => "Низкий прессинг",
        };
        format!("{possession}, {attacking}, {pressing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(t: f64, wind: f64, desc: &str, rain: bool, snow: bool) -> WeatherReport {
        WeatherReport {
            temperature_c: t,
            wind_speed_ms: wind,
            description: desc.to_string(),
            rain,
            snow,
            impact: None,
        }
    }

    #[test]
    fn weather_impact_counts_adverse_signals() {
        assert_eq!(weather(20.0, 2.0, "clear sky", false, false).impact(), WeatherImpact::Positive);
        assert_eq!(weather(20.0, 2.0, "few clouds", false, false).impact(), WeatherImpact::Neutral);
        assert_eq!(weather(12.0, 3.0, "light rain", true, false).impact(), WeatherImpact::SlightNegative);
        assert_eq!(weather(38.0, 1.0, "clear sky", false, false).impact(), WeatherImpact::SlightNegative);
        assert_eq!(weather(-8.0, 3.0, "snow", false, true).impact(), WeatherImpact::Negative);
        assert_eq!(weather(3.0, 8.0, "rain", true, false).impact(), WeatherImpact::Negative);
    }

    #[test]
    fn explicit_impact_wins() {
        let mut w = weather(20.0, 2.0, "clear sky", false, false);
        w.impact = Some(WeatherImpact::Negative);
        assert_eq!(w.impact(), WeatherImpact::Negative);
        assert_eq!(w.impact().goals_adjustment(), -0.3);
    }

    #[test]
    fn halftime_tendency_from_scores() {
        let early = [
            HalfSplitScore { ht_scored: 2, ht_conceded: 0, ft_scored: 2, ft_conceded: 1 },
            HalfSplitScore { ht_scored: 1, ht_conceded: 0, ft_scored: 2, ft_conceded: 0 },
        ];
        let p = HalftimeProfile::from_matches(&early).unwrap();
        assert_eq!(p.tendency, HalfTendency::FirstHalf);
        assert_eq!(p.matches_analyzed, 2);

        let late = [HalfSplitScore { ht_scored: 0, ht_conceded: 0, ft_scored: 2, ft_conceded: 1 }];
        assert_eq!(
            HalftimeProfile::from_matches(&late).unwrap().tendency,
            HalfTendency::SecondHalf
        );

        let broken = [HalfSplitScore { ht_scored: 3, ht_conceded: 0, ft_scored: 1, ft_conceded: 0 }];
        assert!(HalftimeProfile::from_matches(&broken).is_none());
        assert!(HalftimeProfile::from_matches(&[]).is_none());
    }

    #[test]
    fn playstyle_from_averages() {
        let s = Playstyle::from_averages(2.3, 0.8);
        assert_eq!(s.attacking, AttackingStyle::Aggressive);
        assert_eq!(s.possession, PossessionStyle::Possession);
        assert_eq!(s.pressing, Pressing::High);

        let s = Playstyle::from_averages(1.0, 1.6);
        assert_eq!(s.attacking, AttackingStyle::Defensive);
        assert_eq!(s.possession, PossessionStyle::Counter);
        assert_eq!(s.pressing, Pressing::Low);
        assert!(s.description().contains("Контратаки"));
    }
}
