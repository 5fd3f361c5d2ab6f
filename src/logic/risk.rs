use super::constants::{
    COOL_TEMP_RANGE_F, DEW_DAYS_MIN, DEW_HUMIDITY_PCT, EMERGENCE_MAX_DAYS, HIGH_HUMIDITY_PCT,
    LATE_SEASON_MIN_DAYS, LEAF_WETNESS_EXTENDED_HOURS, WARM_TEMP_RANGE_F,
};
use crate::models::WeatherWindow;
use regex_lite::Regex;
use std::sync::OnceLock;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn day_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)\s*-\s*(\d+)\s*days?\s+after\s+planting").expect("valid pattern")
    })
}

/// Best-effort matcher for free-text pest risk windows.
///
/// Supported forms, tried in order:
/// 1. "`<low>-<high> days after planting`" -> arithmetic containment
/// 2. the keywords "emergence" (days <= 14) and "late season" (days >= 90),
///    combined with OR when both appear
/// 3. bare month names matched against the current calendar month
///
/// This is a heuristic over free-text source data, not a grammar.
/// Unrecognized expressions return false so that garbage input never
/// raises a false alarm.
pub fn is_in_risk_window(risk_period: &str, days_since_planting: i64, current_month: u32) -> bool {
    let expr = risk_period.to_lowercase();

    if let Some(caps) = day_range_re().captures(&expr) {
        let low: i64 = match caps[1].parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        let high: i64 = match caps[2].parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        return days_since_planting >= low && days_since_planting <= high;
    }

    let has_emergence = expr.contains("emergence");
    let has_late_season = expr.contains("late season");
    if has_emergence || has_late_season {
        return (has_emergence && days_since_planting <= EMERGENCE_MAX_DAYS)
            || (has_late_season && days_since_planting >= LATE_SEASON_MIN_DAYS);
    }

    MONTH_NAMES
        .iter()
        .enumerate()
        .any(|(idx, name)| expr.contains(name) && current_month == idx as u32 + 1)
}

/// Whether all of a disease's trigger conditions hold against the trailing
/// 7-day weather window (logical AND).
///
/// Conditions that match no known keyword are treated as satisfied, so an
/// unrecognized qualifier never blocks a legitimate alert. Conditions that
/// need a missing aggregate fail instead, since there is no data to
/// support the alert.
pub fn conditions_match(trigger_conditions: &[String], weather: &WeatherWindow) -> bool {
    trigger_conditions
        .iter()
        .all(|cond| condition_holds(cond, weather))
}

fn condition_holds(condition: &str, weather: &WeatherWindow) -> bool {
    let cond = condition.to_lowercase();

    if cond.contains("high humidity") {
        return weather
            .mean_humidity_percent()
            .map(|h| h >= HIGH_HUMIDITY_PCT)
            .unwrap_or(false);
    }
    if cond.contains("warm temperatures") {
        return weather
            .mean_temp_f()
            .map(|t| t >= WARM_TEMP_RANGE_F.0 && t <= WARM_TEMP_RANGE_F.1)
            .unwrap_or(false);
    }
    if cond.contains("cool temperatures") {
        return weather
            .mean_temp_f()
            .map(|t| t >= COOL_TEMP_RANGE_F.0 && t <= COOL_TEMP_RANGE_F.1)
            .unwrap_or(false);
    }
    if cond.contains("extended leaf wetness") {
        return weather
            .mean_leaf_wetness_hours()
            .map(|h| h >= LEAF_WETNESS_EXTENDED_HOURS)
            .unwrap_or(false);
    }
    if cond.contains("extended dew periods") {
        return weather.days_humidity_above(DEW_HUMIDITY_PCT) >= DEW_DAYS_MIN;
    }

    // Unknown qualifier: never block an alert on wording we can't score.
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherDay;
    use chrono::NaiveDate;

    fn window(days: &[(f64, f64, f64)]) -> WeatherWindow {
        WeatherWindow {
            forecast: Vec::new(),
            trailing: days
                .iter()
                .enumerate()
                .map(|(i, &(temp, humidity, wetness))| WeatherDay {
                    date: NaiveDate::from_ymd_opt(2025, 7, i as u32 + 1).unwrap(),
                    avg_temp_f: temp,
                    avg_humidity_percent: humidity,
                    leaf_wetness_hours: wetness,
                })
                .collect(),
        }
    }

    #[test]
    fn day_range_containment() {
        assert!(is_in_risk_window("45-65 days after planting", 50, 1));
        assert!(is_in_risk_window("45-65 days after planting", 45, 1));
        assert!(is_in_risk_window("45-65 days after planting", 65, 1));
        assert!(!is_in_risk_window("45-65 days after planting", 70, 1));
        assert!(!is_in_risk_window("45-65 days after planting", 44, 1));
    }

    #[test]
    fn emergence_and_late_season_keywords() {
        assert!(is_in_risk_window("Emergence and late season", 10, 1));
        assert!(!is_in_risk_window("Emergence and late season", 50, 1));
        assert!(is_in_risk_window("Emergence and late season", 95, 1));
        assert!(is_in_risk_window("Late season only", 120, 1));
        assert!(!is_in_risk_window("Late season only", 10, 1));
    }

    #[test]
    fn month_name_matching() {
        assert!(is_in_risk_window("June", 50, 6));
        assert!(!is_in_risk_window("June", 50, 7));
        assert!(is_in_risk_window("June and July", 50, 7));
        assert!(!is_in_risk_window("June and July", 50, 8));
    }

    #[test]
    fn unrecognized_expressions_fail_closed() {
        assert!(!is_in_risk_window("whenever it feels like it", 50, 6));
        assert!(!is_in_risk_window("", 50, 6));
    }

    #[test]
    fn all_conditions_must_hold() {
        // Mean temp 80F, mean humidity 80%.
        let w = window(&[(80.0, 80.0, 7.0); 7]);
        let both = vec![
            "high humidity".to_string(),
            "warm temperatures".to_string(),
        ];
        assert!(conditions_match(&both, &w));

        let dry = window(&[(80.0, 40.0, 1.0); 7]);
        assert!(!conditions_match(&both, &dry));
    }

    #[test]
    fn dew_periods_need_three_humid_days() {
        let humid3 = window(&[
            (70.0, 85.0, 2.0),
            (70.0, 85.0, 2.0),
            (70.0, 85.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
        ]);
        let cond = vec!["extended dew periods".to_string()];
        assert!(conditions_match(&cond, &humid3));

        let humid2 = window(&[
            (70.0, 85.0, 2.0),
            (70.0, 85.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
            (70.0, 60.0, 2.0),
        ]);
        assert!(!conditions_match(&cond, &humid2));
    }

    #[test]
    fn unknown_keywords_are_permissive() {
        let w = window(&[(80.0, 80.0, 7.0); 7]);
        let conds = vec![
            "high humidity".to_string(),
            "heavy fog rolling off the river".to_string(),
        ];
        assert!(conditions_match(&conds, &w));
    }

    #[test]
    fn missing_weather_blocks_measured_conditions() {
        let empty = WeatherWindow::default();
        let cond = vec!["high humidity".to_string()];
        assert!(!conditions_match(&cond, &empty));
    }
}
